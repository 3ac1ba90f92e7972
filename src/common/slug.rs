// src/common/slug.rs

use crate::common::{error::AppError, validation::field_error};

/// Gera o slug a partir do nome ("Sócio Ouro 2025" -> "socio-ouro-2025").
/// Letras fora do alfabeto latino são mantidas em minúsculas ("Юниор" -> "юниор").
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().map(fold_accent) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Slug de um nome novo; nomes sem nenhuma letra ou dígito são recusados.
pub fn slug_for_name(name: &str) -> Result<String, AppError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(field_error(
            "name",
            "slug",
            "Name must contain at least one letter or digit.",
        ));
    }
    Ok(slug)
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators_and_lowercases() {
        assert_eq!(slugify("  Gold  Member -- Plus "), "gold-member-plus");
    }

    #[test]
    fn folds_accents() {
        assert_eq!(slugify("Sócio Ouro Família"), "socio-ouro-familia");
        assert_eq!(slugify("Niño Campeón"), "nino-campeon");
    }

    #[test]
    fn keeps_non_latin_letters() {
        assert_eq!(slugify("Юниор"), "юниор");
        assert_eq!(slugify("足球 俱乐部"), "足球-俱乐部");
        assert_ne!(slugify("Юниор"), slugify("足球"));
    }

    #[test]
    fn name_without_letters_or_digits_is_rejected() {
        assert!(matches!(slug_for_name("!!! ---"), Err(AppError::ValidationError(_))));
        assert_eq!(slug_for_name("Юниор").unwrap(), "юниор");
    }

    #[test]
    fn case_and_punctuation_variants_share_a_slug() {
        assert_eq!(slugify("Gold"), slugify("gold!"));
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("U-12 Boots (Size 5)"), "u-12-boots-size-5");
    }
}
