// Key bindings: one input byte -> one effect, looked up in a fixed table

/// What a recognized key does, before scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Signed multiples of the linear and angular scale
    Move { linear: f64, angular: f64 },
    /// Zero velocity regardless of scale
    EmergencyStop,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub key: u8,
    pub effect: Effect,
    pub label: &'static str,
}

const fn bind(key: u8, linear: f64, angular: f64, label: &'static str) -> KeyBinding {
    KeyBinding {
        key,
        effect: Effect::Move { linear, angular },
        label,
    }
}

pub const KEY_SPACE: u8 = b' ';

/// Q/E rotate exactly like A/D
pub const KEY_BINDINGS: &[KeyBinding] = &[
    bind(b'w', 1.0, 0.0, "forward"),
    bind(b's', -1.0, 0.0, "backward"),
    bind(b'a', 0.0, 1.0, "rotate left"),
    bind(b'd', 0.0, -1.0, "rotate right"),
    bind(b'q', 0.0, 1.0, "rotate counter-clockwise"),
    bind(b'e', 0.0, -1.0, "rotate clockwise"),
    KeyBinding {
        key: KEY_SPACE,
        effect: Effect::EmergencyStop,
        label: "emergency stop",
    },
];

// Indexed by byte value. Only the exact bytes in the binding list are recognized.
static TABLE: [Option<Effect>; 256] = build_table(KEY_BINDINGS);

const fn build_table(bindings: &[KeyBinding]) -> [Option<Effect>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < bindings.len() {
        let b = bindings[i];
        table[b.key as usize] = Some(b.effect);
        i += 1;
    }
    table
}

/// Effect of a key byte, `None` if the key is not bound
pub fn decode(key: u8) -> Option<Effect> {
    TABLE[key as usize]
}

/// Display name of a bound key for the banner
pub fn key_name(key: u8) -> String {
    match key {
        KEY_SPACE => "SPACE".to_string(),
        k => (k as char).to_ascii_uppercase().to_string(),
    }
}
