//! cpal output stream rendering the shared reed bank

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, RingBuffer};
use tracing::{error, info};

use acordeon::{
    config::AccordionConfig,
    synth::{ReedBank, SharedReedBank},
    MAX_BLOCK_SIZE,
};

/// Samples buffered for the scope and spectrum; the UI drains it every frame.
const SCOPE_CAPACITY: usize = 8192;

pub struct AudioOutput {
    pub bank: SharedReedBank,
    pub scope: Consumer<f32>,
    pub sample_rate: f32,
    // Dropping the stream stops playback.
    _stream: cpal::Stream,
}

pub fn start(config: &AccordionConfig) -> EyreResult<AudioOutput> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = stream_config.sample_rate().0 as f32;
    let channels = stream_config.channels() as usize;
    info!(
        device = %device.name().unwrap_or_default(),
        sample_rate,
        channels,
        "audio output"
    );

    let (scope_tx, scope) = RingBuffer::new(SCOPE_CAPACITY);
    let bank = SharedReedBank::new(
        ReedBank::new(sample_rate, config.max_voices)
            .with_master_gain(config.master_gain)
            .with_scope(scope_tx),
    );

    let render_bank = bank.clone();
    let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];
    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _| {
            let mut bank = render_bank.lock();
            for frames in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                let block = &mut mono[..frames.len() / channels];
                bank.render_block(block);

                // Mono to every channel
                for (frame, &sample) in frames.chunks_mut(channels).zip(block.iter()) {
                    frame.fill(sample);
                }
            }
        },
        |err| error!("audio stream error: {err}"),
        None,
    )?;
    stream.play()?;

    Ok(AudioOutput {
        bank,
        scope,
        sample_rate,
        _stream: stream,
    })
}
