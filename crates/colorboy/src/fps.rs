use std::time::{Duration, Instant};

const SAMPLE_SIZE: usize = 5;
const SAMPLE_PERIOD: Duration = Duration::from_secs(1);

/// Frames-per-second averaged over the last few one-second samples.
#[derive(Debug)]
pub struct FpsCounter {
    samples: [u32; SAMPLE_SIZE],
    bucket: usize,
    frames: u32,
    since: Instant,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            samples: [0; SAMPLE_SIZE],
            bucket: 0,
            frames: 0,
            since: now,
        }
    }

    pub fn add(&mut self, sample: u32) {
        self.samples[self.bucket] = sample;
        self.bucket = (self.bucket + 1) % SAMPLE_SIZE;
    }

    pub fn average(&self) -> f32 {
        self.samples.iter().map(|&s| s as f32).sum::<f32>() / SAMPLE_SIZE as f32
    }

    /// Count one presented frame. Once a second the count becomes a sample
    /// and the new average is returned.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        if now.duration_since(self.since) < SAMPLE_PERIOD {
            return None;
        }
        self.add(self.frames);
        self.frames = 0;
        self.since = now;
        Some(self.average())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_covers_the_whole_ring() {
        let mut fps = FpsCounter::new(Instant::now());
        assert_eq!(fps.average(), 0.0);
        fps.add(60);
        assert_eq!(fps.average(), 12.0);
        for sample in [60, 60, 60, 60] {
            fps.add(sample);
        }
        assert_eq!(fps.average(), 60.0);
        // Oldest sample is overwritten.
        fps.add(10);
        assert_eq!(fps.average(), 50.0);
    }

    #[test]
    fn frames_become_a_sample_each_second() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        for i in 1..30u64 {
            assert_eq!(fps.frame(start + Duration::from_millis(i * 30)), None);
        }
        let average = fps.frame(start + SAMPLE_PERIOD);
        assert_eq!(average, Some(30.0 / SAMPLE_SIZE as f32));
        assert_eq!(fps.frame(start + SAMPLE_PERIOD), None);
    }
}
