use crate::SampleRate;

/// DFT results of a real signal are mirrored; only `samples / 2 + 1` bins
/// carry information, covering 0 to the Nyquist frequency inclusive.
#[must_use]
pub const fn psd_real_length(samples_per_window: usize) -> usize {
	samples_per_window / 2 + 1
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn index_to_frequency(i: usize, sample_rate: SampleRate, samples_per_window: usize) -> f64 {
	i as f64 * sample_rate.as_f64() / samples_per_window as f64
}

#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn frequency_to_index(
	frequency: f64,
	sample_rate: SampleRate,
	samples_per_window: usize,
) -> usize {
	(frequency / sample_rate.as_f64() * samples_per_window as f64).round() as usize
}

pub fn frequency_bins(
	sample_rate: SampleRate,
	samples_per_window: usize,
) -> impl Iterator<Item = f64> {
	(0..psd_real_length(samples_per_window))
		.map(move |i| index_to_frequency(i, sample_rate, samples_per_window))
}
