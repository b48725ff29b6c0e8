/// Downmix interleaved device frames to mono, converting each sample with
/// `convert`, so the analysis path sees one channel whatever the microphone
/// layout.
pub(super) fn append_downmixed_samples<T, F>(
    buf: &mut Vec<f32>,
    data: &[T],
    channels: usize,
    mut convert: F,
) where
    T: Copy,
    F: FnMut(T) -> f32,
{
    if channels <= 1 {
        buf.extend(data.iter().copied().map(&mut convert));
        return;
    }

    let mut acc = 0.0f32;
    let mut count = 0usize;
    for sample in data.iter().copied() {
        acc += convert(sample);
        count += 1;
        if count == channels {
            buf.push(acc / channels as f32);
            acc = 0.0;
            count = 0;
        }
    }
    // Partial trailing frame: average what arrived.
    if count > 0 {
        buf.push(acc / count as f32);
    }
}

/// Mono samples written by the device callback and drained by each analysis
/// tick.
///
/// Bounded so a stalled reader cannot grow it without limit; the oldest
/// samples are dropped first and counted. Once the device reports an error,
/// samples already buffered are still handed out before the loss is reported.
pub(super) struct CaptureBuffer {
    pending: Vec<f32>,
    max_samples: usize,
    dropped_samples: usize,
    lost: Option<String>,
}

impl CaptureBuffer {
    pub(super) fn new(max_samples: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_samples: max_samples.max(1),
            dropped_samples: 0,
            lost: None,
        }
    }

    pub(super) fn append(&mut self, samples: &[f32]) {
        self.pending.extend_from_slice(samples);
        if self.pending.len() > self.max_samples {
            let excess = self.pending.len() - self.max_samples;
            self.pending.drain(..excess);
            self.dropped_samples = self.dropped_samples.saturating_add(excess);
        }
    }

    pub(super) fn mark_lost(&mut self, reason: String) {
        self.lost.get_or_insert(reason);
    }

    /// Everything captured since the previous call, in arrival order. After
    /// a device error, the first call still returns what was buffered and the
    /// next one reports the loss.
    pub(super) fn take(&mut self) -> Result<Vec<f32>, String> {
        if self.pending.is_empty() {
            if let Some(reason) = &self.lost {
                return Err(reason.clone());
            }
        }
        Ok(std::mem::take(&mut self.pending))
    }

    pub(super) fn dropped_samples(&self) -> usize {
        self.dropped_samples
    }
}

/// Callback-side holding area. Converted samples wait here whenever the
/// shared [`CaptureBuffer`] is busy, and go out ahead of newer audio on the
/// next callback that gets the lock.
pub(super) struct CallbackStaging {
    staged: Vec<f32>,
    max_samples: usize,
    dropped_samples: usize,
}

impl CallbackStaging {
    pub(super) fn new(max_samples: usize) -> Self {
        Self {
            staged: Vec::new(),
            max_samples: max_samples.max(1),
            dropped_samples: 0,
        }
    }

    pub(super) fn stage<T, F>(&mut self, data: &[T], channels: usize, convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        append_downmixed_samples(&mut self.staged, data, channels, convert);
        if self.staged.len() > self.max_samples {
            let excess = self.staged.len() - self.max_samples;
            self.staged.drain(..excess);
            self.dropped_samples = self.dropped_samples.saturating_add(excess);
        }
    }

    pub(super) fn flush_into(&mut self, buffer: &mut CaptureBuffer) {
        buffer.append(&self.staged);
        buffer.dropped_samples = buffer
            .dropped_samples
            .saturating_add(std::mem::take(&mut self.dropped_samples));
        self.staged.clear();
    }

    #[cfg(test)]
    pub(super) fn staged_len(&self) -> usize {
        self.staged.len()
    }
}
