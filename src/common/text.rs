// src/common/text.rs

use validator::ValidationError;

// Busca das listas: sem diferenciar maiúsculas nem acentos ("Pérez" == "perez").

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Minúsculas e sem diacríticos.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(fold_char)
        .collect()
}

/// `true` se algum dos campos contém a busca. Busca vazia casa com tudo.
pub fn matches_query(query: &str, fields: &[Option<&str>]) -> bool {
    let needle = normalize_text(query.trim());
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .flatten()
        .any(|field| normalize_text(field).contains(&needle))
}

/// Campo obrigatório de texto: vazio ou só espaços não passa.
pub fn validate_required_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("required".into());
        return Err(err);
    }
    Ok(())
}

/// Aparas nas bordas; string vazia vira `None` (como o banco espera os opcionais).
pub fn trim_to_option(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
