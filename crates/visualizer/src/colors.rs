//! Shared LED color buffer.
//!
//! The producer (usually the caller's main thread) writes RGB bytes at any
//! time and calls [`LedColors::refresh`]. The render thread checks the dirty
//! flag once per frame and, when set, copies the bytes into its own float
//! staging buffer. Individual bytes are relaxed atomics: a frame may observe
//! a mix of old and new LEDs, which is harmless for a visual preview.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};

/// Cloneable handle to the shared RGB array; clones share storage.
#[derive(Clone)]
pub struct LedColors {
    inner: Arc<ColorBuffer>,
}

struct ColorBuffer {
    bytes: Box<[AtomicU8]>,
    dirty: AtomicBool,
}

impl LedColors {
    /// Creates an all-black buffer for `led_count` LEDs.
    pub fn new(led_count: usize) -> Self {
        let bytes = (0..led_count * 3).map(|_| AtomicU8::new(0)).collect();
        Self::from_storage(bytes)
    }

    /// Copies a flat `[r, g, b, r, g, b, ...]` array into a new buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 3 != 0 {
            bail!(
                "LED color array length {} is not a multiple of 3",
                bytes.len()
            );
        }
        let storage = bytes.iter().map(|&value| AtomicU8::new(value)).collect();
        Ok(Self::from_storage(storage))
    }

    fn from_storage(bytes: Box<[AtomicU8]>) -> Self {
        Self {
            inner: Arc::new(ColorBuffer {
                bytes,
                dirty: AtomicBool::new(false),
            }),
        }
    }

    pub fn led_count(&self) -> usize {
        self.inner.bytes.len() / 3
    }

    pub fn len_bytes(&self) -> usize {
        self.inner.bytes.len()
    }

    /// Writes one LED. Out-of-range indices are ignored.
    pub fn set(&self, index: usize, rgb: [u8; 3]) {
        let Some(slot) = self.inner.bytes.get(index * 3..index * 3 + 3) else {
            return;
        };
        for (byte, value) in slot.iter().zip(rgb) {
            byte.store(value, Ordering::Relaxed);
        }
    }

    pub fn get(&self, index: usize) -> Option<[u8; 3]> {
        let slot = self.inner.bytes.get(index * 3..index * 3 + 3)?;
        Some(std::array::from_fn(|channel| {
            slot[channel].load(Ordering::Relaxed)
        }))
    }

    /// Overwrites the whole buffer from a flat RGB array of the same length.
    pub fn copy_from_slice(&self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != self.len_bytes() {
            bail!(
                "LED color array has {} bytes, buffer holds {}",
                bytes.len(),
                self.len_bytes()
            );
        }
        for (slot, &value) in self.inner.bytes.iter().zip(bytes) {
            slot.store(value, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Rewrites every LED with the color returned for its index.
    pub fn fill_with<F>(&self, mut color_for: F)
    where
        F: FnMut(usize) -> [u8; 3],
    {
        for index in 0..self.led_count() {
            self.set(index, color_for(index));
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner
            .bytes
            .iter()
            .map(|byte| byte.load(Ordering::Relaxed))
            .collect()
    }

    /// Queues an upload of the current colors on the next rendered frame.
    pub fn refresh(&self) {
        self.inner.dirty.store(true, Ordering::Release);
    }

    /// Clears the dirty flag, reporting whether a refresh was queued.
    pub fn take_refresh(&self) -> bool {
        self.inner.dirty.swap(false, Ordering::AcqRel)
    }

    /// Converts the bytes into normalized RGBA (alpha 1) and returns the mean
    /// LED intensity, where an LED's intensity is the mean of its channels.
    ///
    /// Only `min(out.len(), led_count)` LEDs are written.
    pub fn sample_into(&self, out: &mut [[f32; 4]]) -> f32 {
        let count = out.len().min(self.led_count());
        if count == 0 {
            return 0.0;
        }

        let mut total_intensity = 0.0;
        for (index, color) in out.iter_mut().take(count).enumerate() {
            let mut led_intensity = 0.0;
            for channel in 0..3 {
                let value = self.inner.bytes[index * 3 + channel].load(Ordering::Relaxed) as f32
                    / 255.0;
                color[channel] = value;
                led_intensity += value / 3.0;
            }
            color[3] = 1.0;
            total_intensity += led_intensity;
        }
        total_intensity / count as f32
    }
}

impl std::fmt::Debug for LedColors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedColors")
            .field("led_count", &self.led_count())
            .field("dirty", &self.inner.dirty.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_requires_rgb_triplets() {
        assert!(LedColors::from_bytes(&[1, 2, 3, 4]).is_err());
        let colors = LedColors::from_bytes(&[255, 0, 0, 0, 255, 0]).expect("colors");
        assert_eq!(colors.led_count(), 2);
        assert_eq!(colors.get(1), Some([0, 255, 0]));
        assert_eq!(colors.get(2), None);
    }

    #[test]
    fn clones_share_storage() {
        let producer = LedColors::new(3);
        let renderer = producer.clone();
        producer.set(2, [10, 20, 30]);
        assert_eq!(renderer.get(2), Some([10, 20, 30]));
        assert_eq!(renderer.to_bytes(), vec![0, 0, 0, 0, 0, 0, 10, 20, 30]);
    }

    #[test]
    fn set_ignores_out_of_range_index() {
        let colors = LedColors::new(1);
        colors.set(5, [1, 2, 3]);
        assert_eq!(colors.to_bytes(), vec![0, 0, 0]);
    }

    #[test]
    fn refresh_flag_is_consumed_once() {
        let colors = LedColors::new(1);
        assert!(!colors.take_refresh());
        colors.refresh();
        colors.refresh();
        assert!(colors.take_refresh());
        assert!(!colors.take_refresh());
    }

    #[test]
    fn copy_from_slice_checks_length() {
        let colors = LedColors::new(2);
        assert!(colors.copy_from_slice(&[1, 2, 3]).is_err());
        colors.copy_from_slice(&[1, 2, 3, 4, 5, 6]).expect("copy");
        assert_eq!(colors.get(1), Some([4, 5, 6]));
    }

    #[test]
    fn fill_with_visits_every_led() {
        let colors = LedColors::new(4);
        colors.fill_with(|index| [index as u8, 0, 255]);
        assert_eq!(colors.get(3), Some([3, 0, 255]));
    }

    #[test]
    fn sample_normalizes_and_averages() {
        let colors = LedColors::from_bytes(&[255, 0, 0, 0, 255, 0, 0, 0, 255]).expect("colors");
        let mut staging = [[0.0; 4]; 3];
        let mean = colors.sample_into(&mut staging);

        assert_eq!(staging[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(staging[1], [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(staging[2], [0.0, 0.0, 1.0, 1.0]);
        assert!((mean - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn sample_of_white_and_black_is_half() {
        let colors = LedColors::from_bytes(&[255, 255, 255, 0, 0, 0]).expect("colors");
        let mut staging = [[0.0; 4]; 2];
        let mean = colors.sample_into(&mut staging);
        assert!((mean - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sample_into_empty_staging_is_dark() {
        let colors = LedColors::new(2);
        assert_eq!(colors.sample_into(&mut []), 0.0);
    }

    #[test]
    fn producer_thread_writes_are_visible() {
        let colors = LedColors::new(8);
        let producer = colors.clone();
        std::thread::spawn(move || {
            producer.fill_with(|_| [200, 100, 50]);
            producer.refresh();
        })
        .join()
        .expect("producer thread");

        assert!(colors.take_refresh());
        assert_eq!(colors.get(7), Some([200, 100, 50]));
    }
}
