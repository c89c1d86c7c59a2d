//! CPAL stream driving an [`AudioOutput`]

use alloc::sync::Arc;
use alloc::vec;

use cpal::traits::DeviceTrait;
use cpal::{SampleFormat, SizedSample};

use super::AudioOutput;
use crate::device::CpalDevice;
use crate::error::Result;

/// Build a paused output stream whose callback renders `output`.
///
/// Integer devices are fed through a conversion buffer allocated here, sized
/// for `read_size` frames; larger callbacks are rendered in several passes.
pub(crate) fn build_stream(device: &CpalDevice, output: Arc<AudioOutput>, read_size: usize) -> Result<cpal::Stream> {
    let config = device.config();
    let stream_config = config.config();

    let stream = match config.sample_format() {
        SampleFormat::F32 => device.device().build_output_stream(
            &stream_config,
            move |data: &mut [f32], _| {
                output.render(data);
            },
            |err| tracing::error!(%err, "output stream error"),
            None,
        )?,
        SampleFormat::I16 => build_converted::<i16>(device, &stream_config, output, read_size, |sample| {
            (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
        })?,
        SampleFormat::U16 => build_converted::<u16>(device, &stream_config, output, read_size, |sample| {
            ((sample.clamp(-1.0, 1.0) + 1.0) * 0.5 * u16::MAX as f32) as u16
        })?,
        format => {
            tracing::error!(?format, "unsupported sample format");
            return Err(cpal::BuildStreamError::StreamConfigNotSupported.into());
        }
    };
    Ok(stream)
}

fn build_converted<T>(
    device: &CpalDevice,
    stream_config: &cpal::StreamConfig,
    output: Arc<AudioOutput>,
    read_size: usize,
    convert: fn(f32) -> T,
) -> core::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + Send + 'static,
{
    let channels = usize::from(stream_config.channels).max(1);
    let mut block = vec![0.0f32; read_size.max(1) * channels];

    device.device().build_output_stream(
        stream_config,
        move |data: &mut [T], _| {
            for chunk in data.chunks_mut(block.len()) {
                let rendered = &mut block[..chunk.len()];
                output.render(rendered);
                for (sample, &value) in chunk.iter_mut().zip(rendered.iter()) {
                    *sample = convert(value);
                }
            }
        },
        |err| tracing::error!(%err, "output stream error"),
        None,
    )
}
