/// Brightness compensation applied to the enclosure and the background.
///
/// The pair is `(gain, offset)`; shaded colors become `color * gain - offset`.
/// Refreshes move the offset goal to the mean LED intensity so a bright cube
/// darkens its surroundings, and the current pair follows the goal at
/// `change_rate` per second.
#[derive(Debug, Clone, PartialEq)]
pub struct Exposure {
    current: [f32; 2],
    goal: [f32; 2],
    change_rate: f32,
}

const NEUTRAL: [f32; 2] = [1.0, 0.0];

impl Exposure {
    pub fn new(change_rate: f32) -> Self {
        Self {
            current: NEUTRAL,
            goal: NEUTRAL,
            change_rate,
        }
    }

    pub fn set_brightness(&mut self, mean_intensity: f32) {
        self.goal[1] = mean_intensity;
    }

    /// Moves toward the goal; the step never passes the goal even after a
    /// long stall.
    pub fn advance(&mut self, dt_seconds: f32) {
        let step = (self.change_rate * dt_seconds.max(0.0)).min(1.0);
        for (current, goal) in self.current.iter_mut().zip(self.goal) {
            *current += (goal - *current) * step;
        }
    }

    pub fn current(&self) -> [f32; 2] {
        self.current
    }

    pub fn goal(&self) -> [f32; 2] {
        self.goal
    }

    pub fn uniform(&self) -> [f32; 2] {
        self.current
    }

    pub fn apply(&self, channel: f32) -> f32 {
        (channel * self.current[0] - self.current[1]).clamp(0.0, 1.0)
    }

    pub fn clear_color(&self, base: [f32; 3]) -> [f32; 3] {
        base.map(|channel| self.apply(channel))
    }
}
