//! Credits, lives and the published wave bonuses.

use crate::error::CommandError;
use crate::observable::Observable;

/// Running economy of one session.
#[derive(Debug)]
pub struct ScoreBoard {
    credits: Observable<u32>,
    /// Credits obtained by playing (kills, wave rewards); drives difficulty.
    credits_earned: u32,
    lives: Observable<u32>,
    early_bonus: Observable<u32>,
    wave_bonus: Observable<u32>,
}

impl ScoreBoard {
    pub fn new(credits: u32, lives: u32) -> Self {
        Self {
            credits: Observable::new(credits),
            credits_earned: 0,
            lives: Observable::new(lives),
            early_bonus: Observable::new(0),
            wave_bonus: Observable::new(0),
        }
    }

    /// Back to the starting economy. Listeners stay registered.
    pub fn reset(&mut self, credits: u32, lives: u32) {
        self.credits.set(credits);
        self.credits_earned = 0;
        self.lives.set(lives);
        self.early_bonus.set(0);
        self.wave_bonus.set(0);
    }

    pub fn credits(&self) -> u32 {
        self.credits.value()
    }

    pub fn credits_earned(&self) -> u32 {
        self.credits_earned
    }

    pub fn lives(&self) -> u32 {
        self.lives.value()
    }

    pub fn early_bonus(&self) -> u32 {
        self.early_bonus.value()
    }

    pub fn wave_bonus(&self) -> u32 {
        self.wave_bonus.value()
    }

    /// Add credits. Only `earned` credits count towards difficulty scaling.
    pub fn give_credits(&mut self, amount: u32, earned: bool) {
        self.credits.update(|c| c.saturating_add(amount));
        if earned {
            self.credits_earned = self.credits_earned.saturating_add(amount);
        }
    }

    /// Debit credits; a debit larger than the balance is rejected untouched.
    pub fn take_credits(&mut self, amount: u32) -> Result<(), CommandError> {
        let available = self.credits.value();
        if amount > available {
            return Err(CommandError::InsufficientCredits {
                needed: amount,
                available,
            });
        }
        self.credits.set(available - amount);
        Ok(())
    }

    pub fn take_lives(&mut self, amount: u32) {
        self.lives.update(|l| l.saturating_sub(amount));
    }

    pub fn set_early_bonus(&mut self, bonus: u32) {
        self.early_bonus.set(bonus);
    }

    pub fn set_wave_bonus(&mut self, bonus: u32) {
        self.wave_bonus.set(bonus);
    }

    /// Restore persisted economy values. A restored session has no wave
    /// running, so both bonuses are zero.
    pub fn restore(&mut self, credits: u32, credits_earned: u32, lives: u32) {
        self.credits.set(credits);
        self.credits_earned = credits_earned;
        self.lives.set(lives);
        self.early_bonus.set(0);
        self.wave_bonus.set(0);
    }

    pub fn on_credits_changed(&mut self, listener: impl FnMut(&u32) + Send + 'static) {
        self.credits.subscribe(listener);
    }

    pub fn on_lives_changed(&mut self, listener: impl FnMut(&u32) + Send + 'static) {
        self.lives.subscribe(listener);
    }

    pub fn on_bonus_changed(&mut self, listener: impl FnMut(&u32) + Send + Clone + 'static) {
        self.early_bonus.subscribe(listener.clone());
        self.wave_bonus.subscribe(listener);
    }
}
