/// Gas constant in kJ/(mol·K).
pub const GAS_CONSTANT: f64 = 0.008314;

/// Stoichiometric multiple of the compensating draw applied to true formers
/// after an intermediate absorbs modifier. Empirically calibrated.
pub const BACK_DRAW_MULTIPLIER: f64 = 3.0;

/// Boltzmann factor `exp(-ΔH / (R·T))` for an enthalpy in kJ/mol.
#[inline]
pub fn boltzmann_weight(enthalpy: f64, temperature: f64) -> f64 {
    (-enthalpy / (temperature * GAS_CONSTANT)).exp()
}

/// Rounds a non-negative draw count: truncates, and adds one when the
/// fractional part is at least one half.
pub fn round_half_up(value: f64) -> usize {
    let whole = value.trunc();
    let mut draws = whole as usize;
    if value - whole >= 0.5 {
        draws += 1;
    }
    draws
}
