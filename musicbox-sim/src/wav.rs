//! Renders the buzzer line to 16-bit mono PCM WAV.

use std::io::Write;

/// Sample value while the buzzer line is high. Quarter scale, a full scale
/// square wave is unpleasant.
pub const HIGH_LEVEL: i16 = i16::MAX / 4;

/// Samples the buzzer line (`(time µs, high)` edges, line low before the
/// first) at `sample_rate` from time zero up to `end_us`
pub fn render(edges: &[(u64, bool)], end_us: u64, sample_rate: u32) -> Vec<i16> {
    let sample_count = end_us * sample_rate as u64 / 1_000_000;

    let mut samples = Vec::with_capacity(sample_count as usize);
    let mut edges = edges.iter().peekable();
    let mut high = false;

    for i in 0..sample_count {
        let at_us = i * 1_000_000 / sample_rate as u64;

        while let Some(&&(edge_us, level)) = edges.peek() {
            if edge_us > at_us {
                break;
            }

            high = level;
            edges.next();
        }

        samples.push(if high { HIGH_LEVEL } else { 0 });
    }

    samples
}

pub fn write_wav(w: &mut impl Write, samples: &[i16], sample_rate: u32) -> std::io::Result<()> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    let data_size = samples.len() as u32 * block_align as u32;

    write_riff_header(w, data_size)?;
    write_fmt_chunk(w, num_channels, sample_rate, block_align, bits_per_sample)?;
    write_data_chunk(w, samples, data_size)
}

fn write_riff_header(w: &mut impl Write, data_size: u32) -> std::io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&(36 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")
}

fn write_fmt_chunk(
    w: &mut impl Write,
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
) -> std::io::Result<()> {
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    // PCM
    w.write_all(&1u16.to_le_bytes())?;
    w.write_all(&num_channels.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&(sample_rate * block_align as u32).to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&bits_per_sample.to_le_bytes())
}

fn write_data_chunk(w: &mut impl Write, samples: &[i16], data_size: u32) -> std::io::Result<()> {
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for sample in samples {
        w.write_all(&sample.to_le_bytes())?;
    }
    Ok(())
}
