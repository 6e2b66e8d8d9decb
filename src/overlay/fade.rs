use thiserror::Error;

/// Returned by `FadeAnimator::tick` on the tick that reaches the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeCompleted {
    pub target: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a fade is already in progress")]
pub struct FadeBusy;

/// Steps an opacity level towards a target by a fixed increment per tick.
///
/// Only one fade runs at a time; requests made while fading are rejected
/// with `FadeBusy` rather than retargeting the running fade.
#[derive(Debug, Clone)]
pub struct FadeAnimator {
    level: f32,
    step: f32,
    target: Option<f32>,
}

impl FadeAnimator {
    pub fn new(step: f32) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step.min(1.0)
        } else {
            0.05
        };
        Self {
            level: 0.0,
            step,
            target: None,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_fading(&self) -> bool {
        self.target.is_some()
    }

    pub fn fade_to(&mut self, target: f32) -> Result<(), FadeBusy> {
        if self.target.is_some() {
            return Err(FadeBusy);
        }
        self.target = Some(target.clamp(0.0, 1.0));
        Ok(())
    }

    /// Advance the running fade by one step.
    pub fn tick(&mut self) -> Option<FadeCompleted> {
        let target = self.target?;

        let reached = if self.level < target {
            self.level = (self.level + self.step).min(1.0);
            self.level >= target
        } else if self.level > target {
            self.level = (self.level - self.step).max(0.0);
            self.level <= target
        } else {
            true
        };

        if reached {
            self.level = target;
            self.target = None;
            Some(FadeCompleted { target })
        } else {
            None
        }
    }
}
