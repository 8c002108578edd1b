use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_quantity(value: f64, unit: &str) -> String {
    const SUFFIXES: [&str; 4] = ["", "k", "M", "B"];

    let mut scaled = value.abs();
    let mut suffix = 0usize;
    while scaled >= 1000.0 && suffix < SUFFIXES.len() - 1 {
        scaled /= 1000.0;
        suffix += 1;
    }

    let sign = if value < 0.0 { "-" } else { "" };
    if suffix == 0 {
        format!("{sign}{scaled:.0} {unit}")
    } else {
        format!("{sign}{scaled:.1}{} {unit}", SUFFIXES[suffix])
    }
}

pub fn short_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let kept = text.chars().take(max_chars.saturating_sub(1)).collect::<String>();
    format!("{}…", kept.trim_end())
}

pub fn stable_seed(base: u64, key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    base.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_scale_with_suffixes() {
        assert_eq!(format_quantity(610.0, "vials"), "610 vials");
        assert_eq!(format_quantity(4_200.0, "capsules"), "4.2k capsules");
        assert_eq!(format_quantity(2_500_000.0, "units"), "2.5M units");
        assert_eq!(format_quantity(-1_500.0, "units"), "-1.5k units");
    }

    #[test]
    fn labels_are_cut_on_char_boundaries() {
        assert_eq!(short_label("ICU", 8), "ICU");
        assert_eq!(short_label("Dispensing Cabinets", 11), "Dispensing…");
        assert_eq!(short_label("Ácido fólico", 4), "Áci…");
    }

    #[test]
    fn seeds_differ_by_key_but_repeat() {
        assert_eq!(stable_seed(7, "amx-500"), stable_seed(7, "amx-500"));
        assert_ne!(stable_seed(7, "amx-500"), stable_seed(7, "hep-5k"));
        assert_ne!(stable_seed(7, "amx-500"), stable_seed(8, "amx-500"));
    }
}
