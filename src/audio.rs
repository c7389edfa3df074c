//! Audio system using the Web Audio API
//!
//! Procedurally generated sound effects - no external files needed. Every
//! call builds a short-lived node graph that self-disposes after its
//! envelope; callers never await or cancel sounds, and a missing
//! AudioContext degrades the whole manager to a no-op.

use web_sys::{
    AudioBuffer, AudioContext, BiquadFilterType, GainNode, OscillatorNode, OscillatorType,
};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bullet fired
    Shoot,
    /// Bullet connects with an enemy
    Hit,
    /// Enemy destroyed
    Explosion,
    /// Level gained
    LevelUp,
    /// Boss entered the arena
    BossSpawn,
    /// Run ended
    GameOver,
    /// New high score
    HighScore,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master: Option<GainNode>,
    noise: Option<AudioBuffer>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context; the game keeps running silent
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }

        let master = ctx.as_ref().and_then(|ctx| {
            let gain = ctx.create_gain().ok()?;
            gain.gain().set_value(0.25);
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some(gain)
        });
        let noise = ctx.as_ref().and_then(create_noise_buffer);

        Self {
            ctx,
            master,
            noise,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect; never blocks, never throws into the frame
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };
        let Some(master) = &self.master else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Shoot => self.play_shoot(ctx, master, vol),
            SoundEffect::Hit => self.play_hit(ctx, master, vol),
            SoundEffect::Explosion => self.play_explosion(ctx, master, vol),
            SoundEffect::LevelUp => self.play_level_up(ctx, master, vol),
            SoundEffect::BossSpawn => self.play_boss_spawn(ctx, master, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, master, vol),
            SoundEffect::HighScore => self.play_high_score(ctx, master, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with a gain envelope routed through the master
    fn create_osc(
        &self,
        ctx: &AudioContext,
        master: &GainNode,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(master).ok()?;

        Some((osc, gain))
    }

    /// Shoot - punchy triangle with a pitch drop
    fn play_shoot(&self, ctx: &AudioContext, master: &GainNode, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, master, 350.0, OscillatorType::Triangle)
        else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(350.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(100.0, t + 0.15)
            .ok();
        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.15)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }

    /// Hit - short square thud
    fn play_hit(&self, ctx: &AudioContext, master: &GainNode, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, master, 150.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(150.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(40.0, t + 0.1)
            .ok();
        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Explosion - filtered noise boom
    fn play_explosion(&self, ctx: &AudioContext, master: &GainNode, vol: f32) {
        let Some(noise) = &self.noise else { return };
        let t = ctx.current_time();

        let Ok(source) = ctx.create_buffer_source() else {
            return;
        };
        source.set_buffer(Some(noise));

        let Ok(filter) = ctx.create_biquad_filter() else {
            return;
        };
        filter.set_type(BiquadFilterType::Lowpass);
        filter.frequency().set_value_at_time(800.0, t).ok();
        filter
            .frequency()
            .exponential_ramp_to_value_at_time(100.0, t + 0.4)
            .ok();

        let Ok(gain) = ctx.create_gain() else { return };
        gain.gain().set_value_at_time(vol * 0.8, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();

        if source.connect_with_audio_node(&filter).is_err()
            || filter.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(master).is_err()
        {
            return;
        }
        source.start().ok();
        source.stop_with_when(t + 0.5).ok();
    }

    /// Level up - major chord arpeggio
    fn play_level_up(&self, ctx: &AudioContext, master: &GainNode, vol: f32) {
        for (i, freq) in [523.25, 659.25, 783.99, 1046.5].iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, master, *freq, OscillatorType::Sine)
            else {
                continue;
            };
            let t = ctx.current_time() + i as f64 * 0.08;

            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * 0.2, t + 0.05)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.5).ok();
        }
    }

    /// Boss spawn - ominous descend
    fn play_boss_spawn(&self, ctx: &AudioContext, master: &GainNode, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, master, 300.0, OscillatorType::Sawtooth)
        else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(30.0, t + 0.8)
            .ok();
        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.8)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 1.0).ok();
    }

    /// Game over - sad descending steps
    fn play_game_over(&self, ctx: &AudioContext, master: &GainNode, vol: f32) {
        for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, master, *freq, OscillatorType::Sine)
            else {
                continue;
            };
            let t = ctx.current_time() + i as f64 * 0.2;

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.4).ok();
        }
    }

    /// High score - celebratory ascent
    fn play_high_score(&self, ctx: &AudioContext, master: &GainNode, vol: f32) {
        for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, master, *freq, OscillatorType::Triangle)
            else {
                continue;
            };
            let t = ctx.current_time() + i as f64 * 0.08;

            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.3).ok();
        }
    }
}

/// Two seconds of white noise, shared by every explosion voice
fn create_noise_buffer(ctx: &AudioContext) -> Option<AudioBuffer> {
    let sample_rate = ctx.sample_rate();
    let length = (sample_rate * 2.0) as u32;
    let buffer = ctx.create_buffer(1, length, sample_rate).ok()?;

    let mut data = vec![0.0f32; length as usize];
    for sample in &mut data {
        *sample = (js_sys::Math::random() as f32) * 2.0 - 1.0;
    }
    buffer.copy_to_channel(&mut data, 0).ok()?;

    Some(buffer)
}
