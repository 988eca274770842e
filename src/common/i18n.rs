// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const DEFAULT_LANG: &str = "pt";

// Catálogos embutidos no binário: um arquivo JSON plano por idioma.
const CATALOGS: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut messages = HashMap::new();
        for (lang, raw) in CATALOGS {
            let catalog: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens '{}' inválido", lang))?;
            messages.insert(lang.to_string(), catalog);
        }
        Ok(Self { messages })
    }

    /// Busca a mensagem no idioma pedido, cai para o português e, por fim, para a própria chave.
    /// Placeholders no formato `{nome}` são substituídos pelos `params`.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, &str)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        params.iter().fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), value)
        })
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.messages.contains_key(lang)
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.messages
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_with_params() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate("pt", "error.not_found", &[("resource", "Reserva")]);
        assert!(msg.contains("Reserva"));
        assert!(!msg.contains("{resource}"));
    }

    #[test]
    fn test_falls_back_to_portuguese_then_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(
            store.translate("de", "error.invalid_token", &[]),
            store.translate("pt", "error.invalid_token", &[])
        );
        assert_eq!(store.translate("en", "chave.inexistente", &[]), "chave.inexistente");
    }

    #[test]
    fn test_catalogs_have_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let pt = &store.messages["pt"];
        let en = &store.messages["en"];
        for key in pt.keys() {
            assert!(en.contains_key(key), "chave '{}' sem tradução em inglês", key);
        }
        assert_eq!(pt.len(), en.len());
    }
}
