// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

pub const DEFAULT_LANG: &str = "en";

const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("not_found", "The requested {resource} was not found."),
    ("duplicate_name", "The name '{name}' is already in use."),
    ("duplicate_slug", "A record with an equivalent name already exists (slug '{slug}')."),
    ("email_exists", "This e-mail is already registered."),
    ("invalid_credentials", "Invalid e-mail or password."),
    ("invalid_token", "Missing or invalid authentication token."),
    ("forbidden", "You do not have permission to perform this action."),
    ("invalid_transition", "Cannot {action} while the record is {from}."),
    ("concurrent_modification", "The record was modified by another request. Reload and try again."),
    ("listing_limit", "You have reached your listing limit ({limit})."),
    ("own_item_offer", "You cannot make an offer on your own item."),
    ("item_unavailable", "This item is no longer available."),
    ("already_rated", "You have already rated this transaction."),
    ("invalid_date_range", "The start date must not be after the end date."),
    ("resource_in_use", "This {resource} is still referenced and cannot be deleted."),
    ("internal_error", "An unexpected error occurred."),
];

const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("not_found", "O recurso solicitado ({resource}) não foi encontrado."),
    ("duplicate_name", "O nome '{name}' já está em uso."),
    ("duplicate_slug", "Já existe um registro com nome equivalente (slug '{slug}')."),
    ("email_exists", "Este e-mail já está em uso."),
    ("invalid_credentials", "E-mail ou senha inválidos."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("forbidden", "Você não tem permissão para realizar esta ação."),
    ("invalid_transition", "Não é possível executar '{action}' com o registro em '{from}'."),
    ("concurrent_modification", "O registro foi alterado por outra requisição. Recarregue e tente novamente."),
    ("listing_limit", "Você atingiu o seu limite de anúncios ({limit})."),
    ("own_item_offer", "Você não pode fazer uma oferta no seu próprio item."),
    ("item_unavailable", "Este item não está mais disponível."),
    ("already_rated", "Você já avaliou esta negociação."),
    ("invalid_date_range", "A data de início não pode ser posterior à data de término."),
    ("resource_in_use", "Este recurso ({resource}) ainda está em uso e não pode ser removido."),
    ("internal_error", "Ocorreu um erro inesperado."),
];

const ES: &[(&str, &str)] = &[
    ("validation_failed", "Uno o más campos no son válidos."),
    ("not_found", "No se encontró el recurso solicitado ({resource})."),
    ("duplicate_name", "El nombre '{name}' ya está en uso."),
    ("duplicate_slug", "Ya existe un registro con un nombre equivalente (slug '{slug}')."),
    ("email_exists", "Este correo ya está registrado."),
    ("invalid_credentials", "Correo o contraseña incorrectos."),
    ("invalid_token", "Token de autenticación inválido o ausente."),
    ("forbidden", "No tienes permiso para realizar esta acción."),
    ("invalid_transition", "No se puede '{action}' con el registro en '{from}'."),
    ("concurrent_modification", "Otra solicitud modificó el registro. Recarga e inténtalo de nuevo."),
    ("listing_limit", "Has alcanzado tu límite de publicaciones ({limit})."),
    ("own_item_offer", "No puedes ofertar por tu propio artículo."),
    ("item_unavailable", "Este artículo ya no está disponible."),
    ("already_rated", "Ya calificaste esta operación."),
    ("invalid_date_range", "La fecha de inicio no puede ser posterior a la de fin."),
    ("resource_in_use", "Este recurso ({resource}) sigue en uso y no se puede eliminar."),
    ("internal_error", "Ocurrió un error inesperado."),
];

static SHARED: LazyLock<I18nStore> = LazyLock::new(I18nStore::load);

/// Catálogo de mensagens por idioma.
#[derive(Debug)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    fn load() -> Self {
        let catalogs = [("en", EN), ("pt", PT), ("es", ES)]
            .into_iter()
            .map(|(lang, entries)| (lang, entries.iter().copied().collect()))
            .collect();
        Self { catalogs }
    }

    pub fn shared() -> &'static I18nStore {
        &SHARED
    }

    /// Traduz `key` para `lang`, caindo para o inglês; sem entrada, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, &str)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .copied()
            .unwrap_or(key);

        params.iter().fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_parameters() {
        let store = I18nStore::shared();
        let msg = store.translate("en", "not_found", &[("resource", "advertisement")]);
        assert_eq!(msg, "The requested advertisement was not found.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::shared();
        assert_eq!(
            store.translate("de", "forbidden", &[]),
            "You do not have permission to perform this action."
        );
    }

    #[test]
    fn every_language_covers_the_english_keys() {
        let store = I18nStore::shared();
        for (key, _) in EN {
            for lang in ["pt", "es"] {
                assert!(
                    store.catalogs[lang].contains_key(key),
                    "missing '{key}' for '{lang}'"
                );
            }
        }
    }
}
