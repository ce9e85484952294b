// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

const FALLBACK_LANG: &str = "en";

// Catálogos embutidos no binário (um JSON plano por idioma)
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("es", include_str!("../../locales/es.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Mensagens traduzidas, indexadas por idioma e chave.
#[derive(Debug)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("catálogo de mensagens '{}' inválido", lang))?;
            catalogs.insert((*lang).to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Idioma pedido -> inglês -> a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        [lang, FALLBACK_LANG]
            .iter()
            .filter_map(|l| self.catalogs.get(*l))
            .find_map(|catalog| catalog.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Igual a `translate`, substituindo `{nome}` pelos argumentos.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.translate(lang, key), |message, (name, value)| {
            message.replace(&format!("{{{}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_has_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let reference = &store.catalogs[FALLBACK_LANG];
        for (lang, catalog) in &store.catalogs {
            for key in reference.keys() {
                assert!(catalog.contains_key(key), "'{}' sem a chave '{}'", lang, key);
            }
        }
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::load().unwrap();
        assert_eq!(
            store.translate("de", "customer_not_found"),
            store.translate("en", "customer_not_found")
        );
    }

    #[test]
    fn unknown_key_is_returned_as_is() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("pt", "no_such_key"), "no_such_key");
    }

    #[test]
    fn placeholders_are_substituted() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate_with("es", "permission_denied", &[("permission", "customers.view_customer")]);
        assert!(msg.contains("customers.view_customer"));
        assert!(!msg.contains("{permission}"));
    }
}
