//! Status line and HUD telemetry. Both are pure theatre: bounded random walks
//! redrawn on a timer by the DOM glue.

use rand::Rng;

pub const STATES: &[&str] = &[
    "idle", "observing", "analyzing", "listening", "scanning", "processing", "connecting",
    "disconnecting", "alert", "warning", "critical", "standby", "active", "monitoring", "tracking",
];

/// A fresh `status: <state>` line.
pub fn random_status<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("status: {}", STATES[rng.gen_range(0..STATES.len())])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertLevel {
    Nominal,
    Elevated,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn color(self) -> &'static str {
        match self {
            AlertLevel::Critical => "#ff4444",
            AlertLevel::Warning => "#ffaa44",
            AlertLevel::Elevated => "#ffdd44",
            AlertLevel::Nominal => "#7dff9b",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HudStats {
    pub enemies: i32,
    pub alerts: i32,
    pub connections: i32,
    pub memory: i32,
    pub network: i32,
    pub temperature: i32,
    pub cpu: i32,
}

impl HudStats {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            enemies: rng.gen_range(0..12),
            alerts: 0,
            connections: rng.gen_range(10..60),
            memory: rng.gen_range(30..70),
            network: rng.gen_range(50..150),
            temperature: rng.gen_range(40..60),
            cpu: rng.gen_range(20..50),
        }
    }

    /// One HUD refresh: nudge every gauge and keep it inside its band.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.enemies = (self.enemies + rng.gen_range(-1..=1)).max(0);
        self.alerts = (self.alerts + rng.gen_range(-1..=0)).max(0);
        self.connections = (self.connections + rng.gen_range(-5..5)).max(0);
        self.memory = (self.memory + rng.gen_range(-3..3)).clamp(20, 90);
        self.network = (self.network + rng.gen_range(-10..10)).clamp(10, 200);
        self.temperature = (self.temperature + rng.gen_range(-2..2)).clamp(35, 75);
        self.cpu = rng.gen_range(20..50);
    }

    pub fn alert_level(&self) -> AlertLevel {
        if self.alerts > 3 || self.cpu > 80 || self.memory > 85 || self.temperature > 70 {
            AlertLevel::Critical
        } else if self.alerts > 1 || self.cpu > 60 || self.memory > 70 || self.temperature > 60 {
            AlertLevel::Warning
        } else if self.alerts > 0 || self.cpu > 40 || self.memory > 50 {
            AlertLevel::Elevated
        } else {
            AlertLevel::Nominal
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Enemies detected: {}", self.enemies),
            format!("Active connections: {}", self.connections),
            format!("System alerts: {}", self.alerts),
            format!("CPU: {}%", self.cpu),
            format!("Memory: {}%", self.memory),
            format!("Network: {} Mbps", self.network),
            format!("Temperature: {}°C", self.temperature),
        ]
    }
}
