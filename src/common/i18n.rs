// src/common/i18n.rs

use std::collections::HashMap;

// Idioma usado quando o pedido não casa com nenhum dos carregados
pub const DEFAULT_LANG: &str = "es";

const BUNDLES: [(&str, &str); 3] = [
    ("es", include_str!("../../locales/es.json")),
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Mensagens de erro por idioma: idioma -> (chave -> texto).
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    bundles: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut bundles = HashMap::new();
        for (lang, raw) in BUNDLES {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Arquivo de idioma '{}' inválido: {}", lang, e))?;
            bundles.insert(lang.to_string(), messages);
        }
        Ok(Self { bundles })
    }

    /// Procura no idioma pedido, depois no padrão; sem tradução, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.bundles
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.bundles.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bundle_has_the_default_keys() {
        let store = I18nStore::load().unwrap();
        let default_keys = &store.bundles[DEFAULT_LANG];
        for lang in ["en", "pt"] {
            for key in default_keys.keys() {
                assert!(store.bundles[lang].contains_key(key), "{} sem a chave {}", lang, key);
            }
        }
    }

    #[test]
    fn falls_back_to_spanish_then_to_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("fr", "invalid_token"), store.translate("es", "invalid_token"));
        assert_eq!(store.translate("en", "no.such.key"), "no.such.key");
    }
}
