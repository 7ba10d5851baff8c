/// Element symbols indexed by atomic number minus one (H through Og).
const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Chemical symbol for an atomic number, if it names a known element.
pub fn symbol(atomic_number: u32) -> Option<&'static str> {
    let idx = usize::try_from(atomic_number).ok()?.checked_sub(1)?;
    SYMBOLS.get(idx).copied()
}

/// Chemical symbol for an atomic number; unknown numbers (ghost atoms,
/// point charges) become `El<n>` so the atom is still recorded.
pub fn symbol_or_placeholder(atomic_number: i64) -> String {
    u32::try_from(atomic_number)
        .ok()
        .and_then(symbol)
        .map(str::to_string)
        .unwrap_or_else(|| format!("El{}", atomic_number))
}

/// Returns `true` if `token` is a known element symbol (case-sensitive).
pub fn is_symbol(token: &str) -> bool {
    SYMBOLS.contains(&token)
}
