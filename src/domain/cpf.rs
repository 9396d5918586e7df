pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_valid(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || cpf.len() != 11 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9], 10) == digits[9] && check_digit(&digits[..10], 11) == digits[10]
}

fn check_digit(base: &[u32], factor_start: u32) -> u32 {
    let sum: u32 = base
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (factor_start - i as u32))
        .sum();
    let rest = (sum * 10) % 11;
    if rest == 10 {
        0
    } else {
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid, normalize};

    #[test]
    fn accepts_known_valid_cpf() {
        assert!(is_valid("52998224725"));
    }

    #[test]
    fn rejects_flipped_check_digit() {
        assert!(!is_valid("52998224724"));
    }

    #[test]
    fn rejects_repeated_digit_sequences() {
        for d in 0..=9 {
            let cpf: String = std::iter::repeat(char::from_digit(d, 10).unwrap()).take(11).collect();
            assert!(!is_valid(&cpf), "{} should be invalid", cpf);
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!is_valid("5299822472"));
        assert!(!is_valid("529982247250"));
        assert!(!is_valid(""));
    }

    #[test]
    fn normalize_strips_punctuation() {
        let cpf = normalize("529.982.247-25");
        assert_eq!(cpf, "52998224725");
        assert!(is_valid(&cpf));
    }
}
