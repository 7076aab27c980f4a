//! Request body and query-string validation.
//!
//! Every endpoint parses its raw JSON into a typed request here before any
//! database work. Each rejection carries the machine-readable code the API
//! has always returned, so clients can keep matching on `code`.

use serde_json::Value;
use thiserror::Error;

/// Default page size for veille listings.
pub const VEILLE_PAGE_DEFAULT: i64 = 10;
/// Default page size for historique listings.
pub const HISTORIQUE_PAGE_DEFAULT: i64 = 50;
/// Hard ceiling on any page size.
pub const PAGE_MAX: i64 = 100;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("User ID cannot be provided in request body")]
    UserIdInBody,
    #[error("Titre is required")]
    MissingTitre,
    #[error("Sujet is required")]
    MissingSujet,
    #[error("sujet is required")]
    MissingGenerateSujet,
    #[error("Valid ID is required")]
    InvalidId,
    #[error("Titre must be a non-empty string")]
    InvalidTitre,
    #[error("Sujet must be a non-empty string")]
    InvalidSujet,
    #[error("Contexte must be a string or null")]
    InvalidContexte,
    #[error("Resultat must be a string or null")]
    InvalidResultat,
    #[error("veilleId is required")]
    MissingVeilleId,
    #[error("veilleId must be a valid integer")]
    InvalidVeilleId,
    #[error("Invalid veilleId parameter")]
    InvalidVeilleIdFilter,
    #[error("contenu is required and cannot be empty")]
    MissingContenu,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserIdInBody => "USER_ID_NOT_ALLOWED",
            Self::MissingTitre => "MISSING_TITRE",
            Self::MissingSujet | Self::MissingGenerateSujet => "MISSING_SUJET",
            Self::InvalidId => "INVALID_ID",
            Self::InvalidTitre => "INVALID_TITRE",
            Self::InvalidSujet => "INVALID_SUJET",
            Self::InvalidContexte => "INVALID_CONTEXTE",
            Self::InvalidResultat => "INVALID_RESULTAT",
            Self::MissingVeilleId => "MISSING_VEILLE_ID",
            Self::InvalidVeilleId | Self::InvalidVeilleIdFilter => "INVALID_VEILLE_ID",
            Self::MissingContenu => "MISSING_CONTENU",
        }
    }
}

/// Three-state field of a partial update: leave untouched, set to NULL, or
/// overwrite with a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

/// Validated body of `POST /veille`. All text fields arrive trimmed;
/// optional fields that were blank are already collapsed to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVeille {
    pub titre: String,
    pub sujet: String,
    pub contexte: Option<String>,
    pub resultat: Option<String>,
}

/// Validated body of `PUT /veille/{id}`. `titre`/`sujet` may only be
/// replaced, never cleared; `contexte`/`resultat` are tri-state. Note that
/// setting `contexte` to a blank string stores the empty string, unlike
/// create where blank collapses to NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateVeille {
    pub titre: Option<String>,
    pub sujet: Option<String>,
    pub contexte: Patch<String>,
    pub resultat: Patch<String>,
}

/// Validated body of `POST /historique`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateHistorique {
    pub veille_id: i64,
    pub contenu: String,
}

/// Validated body of `POST /generate-veille`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub veille_id: i64,
    pub sujet: String,
    pub contexte: Option<String>,
}

/// The owner of a record is always the session user. Any spelling of a
/// user id in the body is rejected outright, even with a null value.
pub fn reject_user_id(body: &Value) -> Result<(), ValidationError> {
    if body.get("userId").is_some() || body.get("user_id").is_some() {
        return Err(ValidationError::UserIdInBody);
    }
    Ok(())
}

pub fn create_veille(body: &Value) -> Result<CreateVeille, ValidationError> {
    reject_user_id(body)?;
    let titre = required_text(body, "titre", ValidationError::MissingTitre)?;
    let sujet = required_text(body, "sujet", ValidationError::MissingSujet)?;
    let contexte = optional_text(body, "contexte", ValidationError::InvalidContexte)?;
    let resultat = optional_text(body, "resultat", ValidationError::InvalidResultat)?;
    Ok(CreateVeille {
        titre,
        sujet,
        contexte,
        resultat,
    })
}

/// Field-level checks for an update. The caller has already verified the
/// record exists and belongs to the session user; `reject_user_id` runs
/// separately before that lookup.
pub fn update_veille(body: &Value) -> Result<UpdateVeille, ValidationError> {
    let titre = replace_text(body, "titre", ValidationError::InvalidTitre)?;
    let sujet = replace_text(body, "sujet", ValidationError::InvalidSujet)?;
    let contexte = patch_text(body, "contexte", ValidationError::InvalidContexte)?;
    let resultat = patch_text(body, "resultat", ValidationError::InvalidResultat)?;
    Ok(UpdateVeille {
        titre,
        sujet,
        contexte,
        resultat,
    })
}

pub fn create_historique(body: &Value) -> Result<CreateHistorique, ValidationError> {
    reject_user_id(body)?;
    let raw_id = body.get("veilleId");
    if veille_id_absent(raw_id) {
        return Err(ValidationError::MissingVeilleId);
    }
    let contenu = required_text(body, "contenu", ValidationError::MissingContenu)?;
    let veille_id = parse_veille_id(raw_id)?;
    Ok(CreateHistorique { veille_id, contenu })
}

pub fn generate_request(body: &Value) -> Result<GenerateRequest, ValidationError> {
    let raw_id = body.get("veilleId");
    if veille_id_absent(raw_id) {
        return Err(ValidationError::MissingVeilleId);
    }
    let sujet = required_text(body, "sujet", ValidationError::MissingGenerateSujet)?;
    let veille_id = parse_veille_id(raw_id)?;
    let contexte = optional_text(body, "contexte", ValidationError::InvalidContexte)?;
    Ok(GenerateRequest {
        veille_id,
        sujet,
        contexte,
    })
}

/// Path segment of `/veille/{id}`. Strictly numeric: trailing garbage that
/// a lenient parser would swallow is rejected.
pub fn parse_path_id(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidId)
}

/// Optional `veilleId` query filter on historique listings. An empty
/// parameter means no filter, anything non-numeric is an error.
pub fn parse_veille_id_filter(raw: Option<&str>) -> Result<Option<i64>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ValidationError::InvalidVeilleIdFilter),
    }
}

/// Page size: unparseable input falls back to the endpoint default, the
/// result is always clamped to `[1, PAGE_MAX]`.
pub fn parse_limit(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
        .clamp(1, PAGE_MAX)
}

/// Offset: unparseable or negative input becomes 0.
pub fn parse_offset(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
        .max(0)
}

/// A required text field: must be a string with a non-blank trim.
fn required_text(body: &Value, key: &str, err: ValidationError) -> Result<String, ValidationError> {
    match body.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(err),
    }
}

/// An optional nullable text field: absent, null or blank all become `None`.
fn optional_text(
    body: &Value,
    key: &str,
    err: ValidationError,
) -> Result<Option<String>, ValidationError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(_) => Err(err),
    }
}

/// Update semantics for `titre`/`sujet`: absent keeps the stored value,
/// anything present must be a non-blank string.
fn replace_text(
    body: &Value,
    key: &str,
    err: ValidationError,
) -> Result<Option<String>, ValidationError> {
    match body.get(key) {
        None => Ok(None),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
        Some(_) => Err(err),
    }
}

/// Update semantics for `contexte`/`resultat`: absent keeps, null clears,
/// a string is stored trimmed (possibly empty).
fn patch_text(
    body: &Value,
    key: &str,
    err: ValidationError,
) -> Result<Patch<String>, ValidationError> {
    match body.get(key) {
        None => Ok(Patch::Keep),
        Some(Value::Null) => Ok(Patch::Clear),
        Some(Value::String(s)) => Ok(Patch::Set(s.trim().to_string())),
        Some(_) => Err(err),
    }
}

/// "Required" for `veilleId` keeps the historical loose semantics: absent,
/// null, zero, false and the empty string all count as missing.
fn veille_id_absent(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => true,
        Some(Value::Bool(false)) => true,
        Some(Value::Number(n)) => n.as_i64() == Some(0) || n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// A present `veilleId` must be an integer number or a fully numeric string.
fn parse_veille_id(raw: Option<&Value>) -> Result<i64, ValidationError> {
    match raw {
        Some(Value::Number(n)) => n.as_i64().ok_or(ValidationError::InvalidVeilleId),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidVeilleId),
        _ => Err(ValidationError::InvalidVeilleId),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_accepts_full_body() {
        let body = json!({
            "titre": "  Ma veille  ",
            "sujet": "IA générative",
            "contexte": "  secteur santé  ",
            "resultat": "déjà rempli"
        });
        let parsed = create_veille(&body).unwrap();
        assert_eq!(parsed.titre, "Ma veille");
        assert_eq!(parsed.sujet, "IA générative");
        assert_eq!(parsed.contexte.as_deref(), Some("secteur santé"));
        assert_eq!(parsed.resultat.as_deref(), Some("déjà rempli"));
    }

    #[test]
    fn create_accepts_minimal_body() {
        let body = json!({"titre": "T", "sujet": "S"});
        let parsed = create_veille(&body).unwrap();
        assert_eq!(parsed.contexte, None);
        assert_eq!(parsed.resultat, None);
    }

    #[test]
    fn create_rejects_user_id_in_any_spelling() {
        let camel = json!({"titre": "T", "sujet": "S", "userId": "u1"});
        let snake = json!({"titre": "T", "sujet": "S", "user_id": "u1"});
        assert_eq!(create_veille(&camel), Err(ValidationError::UserIdInBody));
        assert_eq!(create_veille(&snake), Err(ValidationError::UserIdInBody));
    }

    #[test]
    fn create_rejects_null_user_id_too() {
        let body = json!({"titre": "T", "sujet": "S", "userId": null});
        assert_eq!(create_veille(&body), Err(ValidationError::UserIdInBody));
    }

    #[test]
    fn create_user_id_check_runs_before_field_checks() {
        let body = json!({"userId": "u1"});
        assert_eq!(create_veille(&body), Err(ValidationError::UserIdInBody));
    }

    #[test]
    fn create_requires_titre_and_sujet() {
        assert_eq!(
            create_veille(&json!({"sujet": "S"})),
            Err(ValidationError::MissingTitre)
        );
        assert_eq!(
            create_veille(&json!({"titre": "   ", "sujet": "S"})),
            Err(ValidationError::MissingTitre)
        );
        assert_eq!(
            create_veille(&json!({"titre": "T"})),
            Err(ValidationError::MissingSujet)
        );
        assert_eq!(
            create_veille(&json!({"titre": "T", "sujet": ""})),
            Err(ValidationError::MissingSujet)
        );
    }

    #[test]
    fn create_treats_non_string_titre_as_missing() {
        let body = json!({"titre": 42, "sujet": "S"});
        assert_eq!(create_veille(&body), Err(ValidationError::MissingTitre));
    }

    #[test]
    fn create_collapses_blank_optionals_to_none() {
        let body = json!({"titre": "T", "sujet": "S", "contexte": "   ", "resultat": null});
        let parsed = create_veille(&body).unwrap();
        assert_eq!(parsed.contexte, None);
        assert_eq!(parsed.resultat, None);
    }

    #[test]
    fn create_rejects_non_string_optionals() {
        assert_eq!(
            create_veille(&json!({"titre": "T", "sujet": "S", "contexte": 3})),
            Err(ValidationError::InvalidContexte)
        );
        assert_eq!(
            create_veille(&json!({"titre": "T", "sujet": "S", "resultat": ["x"]})),
            Err(ValidationError::InvalidResultat)
        );
    }

    #[test]
    fn update_keeps_absent_fields() {
        let parsed = update_veille(&json!({})).unwrap();
        assert_eq!(parsed.titre, None);
        assert_eq!(parsed.sujet, None);
        assert_eq!(parsed.contexte, Patch::Keep);
        assert_eq!(parsed.resultat, Patch::Keep);
    }

    #[test]
    fn update_replaces_titre_trimmed() {
        let parsed = update_veille(&json!({"titre": "  Nouveau  "})).unwrap();
        assert_eq!(parsed.titre.as_deref(), Some("Nouveau"));
    }

    #[test]
    fn update_rejects_blank_or_null_titre() {
        assert_eq!(
            update_veille(&json!({"titre": "  "})),
            Err(ValidationError::InvalidTitre)
        );
        assert_eq!(
            update_veille(&json!({"titre": null})),
            Err(ValidationError::InvalidTitre)
        );
        assert_eq!(
            update_veille(&json!({"sujet": 1})),
            Err(ValidationError::InvalidSujet)
        );
    }

    #[test]
    fn update_null_clears_contexte() {
        let parsed = update_veille(&json!({"contexte": null})).unwrap();
        assert_eq!(parsed.contexte, Patch::Clear);
    }

    #[test]
    fn update_blank_contexte_stays_empty_string() {
        let parsed = update_veille(&json!({"contexte": "   "})).unwrap();
        assert_eq!(parsed.contexte, Patch::Set(String::new()));
    }

    #[test]
    fn update_rejects_non_string_resultat() {
        assert_eq!(
            update_veille(&json!({"resultat": true})),
            Err(ValidationError::InvalidResultat)
        );
    }

    #[test]
    fn historique_accepts_number_and_string_ids() {
        let by_number = json!({"veilleId": 12, "contenu": " rapport "});
        let by_string = json!({"veilleId": "12", "contenu": "rapport"});
        assert_eq!(
            create_historique(&by_number).unwrap(),
            CreateHistorique {
                veille_id: 12,
                contenu: "rapport".to_string()
            }
        );
        assert_eq!(create_historique(&by_string).unwrap().veille_id, 12);
    }

    #[test]
    fn historique_treats_zero_null_and_empty_as_missing() {
        for body in [
            json!({"contenu": "c"}),
            json!({"veilleId": null, "contenu": "c"}),
            json!({"veilleId": 0, "contenu": "c"}),
            json!({"veilleId": "", "contenu": "c"}),
            json!({"veilleId": false, "contenu": "c"}),
        ] {
            assert_eq!(
                create_historique(&body),
                Err(ValidationError::MissingVeilleId)
            );
        }
    }

    #[test]
    fn historique_checks_contenu_before_id_format() {
        let body = json!({"veilleId": "abc"});
        assert_eq!(create_historique(&body), Err(ValidationError::MissingContenu));
    }

    #[test]
    fn historique_rejects_non_integer_ids() {
        for body in [
            json!({"veilleId": "abc", "contenu": "c"}),
            json!({"veilleId": 1.5, "contenu": "c"}),
            json!({"veilleId": true, "contenu": "c"}),
            json!({"veilleId": "12abc", "contenu": "c"}),
        ] {
            assert_eq!(
                create_historique(&body),
                Err(ValidationError::InvalidVeilleId)
            );
        }
    }

    #[test]
    fn historique_requires_non_blank_contenu() {
        let body = json!({"veilleId": 1, "contenu": "   "});
        assert_eq!(create_historique(&body), Err(ValidationError::MissingContenu));
    }

    #[test]
    fn historique_rejects_user_id_first() {
        let body = json!({"userId": "u1", "veilleId": 1, "contenu": "c"});
        assert_eq!(create_historique(&body), Err(ValidationError::UserIdInBody));
    }

    #[test]
    fn generate_parses_full_body() {
        let body = json!({"veilleId": 7, "sujet": " IA ", "contexte": " santé "});
        let parsed = generate_request(&body).unwrap();
        assert_eq!(parsed.veille_id, 7);
        assert_eq!(parsed.sujet, "IA");
        assert_eq!(parsed.contexte.as_deref(), Some("santé"));
    }

    #[test]
    fn generate_requires_veille_id_then_sujet() {
        assert_eq!(
            generate_request(&json!({"sujet": "S"})),
            Err(ValidationError::MissingVeilleId)
        );
        assert_eq!(
            generate_request(&json!({"veilleId": "abc"})),
            Err(ValidationError::MissingGenerateSujet)
        );
        assert_eq!(
            generate_request(&json!({"veilleId": "abc", "sujet": "S"})),
            Err(ValidationError::InvalidVeilleId)
        );
    }

    #[test]
    fn generate_drops_blank_contexte() {
        let body = json!({"veilleId": 7, "sujet": "S", "contexte": "  "});
        assert_eq!(generate_request(&body).unwrap().contexte, None);
    }

    #[test]
    fn path_id_is_strictly_numeric() {
        assert_eq!(parse_path_id("42"), Ok(42));
        assert_eq!(parse_path_id(" 7 "), Ok(7));
        assert_eq!(parse_path_id("abc"), Err(ValidationError::InvalidId));
        assert_eq!(parse_path_id("12abc"), Err(ValidationError::InvalidId));
        assert_eq!(parse_path_id(""), Err(ValidationError::InvalidId));
    }

    #[test]
    fn veille_id_filter_empty_means_no_filter() {
        assert_eq!(parse_veille_id_filter(None), Ok(None));
        assert_eq!(parse_veille_id_filter(Some("")), Ok(None));
        assert_eq!(parse_veille_id_filter(Some("12")), Ok(Some(12)));
        assert_eq!(
            parse_veille_id_filter(Some("abc")),
            Err(ValidationError::InvalidVeilleIdFilter)
        );
    }

    #[test]
    fn limit_falls_back_and_clamps() {
        assert_eq!(parse_limit(None, VEILLE_PAGE_DEFAULT), 10);
        assert_eq!(parse_limit(Some("junk"), VEILLE_PAGE_DEFAULT), 10);
        assert_eq!(parse_limit(Some("200"), HISTORIQUE_PAGE_DEFAULT), 100);
        assert_eq!(parse_limit(Some("0"), VEILLE_PAGE_DEFAULT), 1);
        assert_eq!(parse_limit(Some("-5"), VEILLE_PAGE_DEFAULT), 1);
        assert_eq!(parse_limit(Some("50"), VEILLE_PAGE_DEFAULT), 50);
    }

    #[test]
    fn offset_never_goes_negative() {
        assert_eq!(parse_offset(None), 0);
        assert_eq!(parse_offset(Some("junk")), 0);
        assert_eq!(parse_offset(Some("-3")), 0);
        assert_eq!(parse_offset(Some("25")), 25);
    }

    #[test]
    fn codes_match_the_wire_contract() {
        assert_eq!(ValidationError::UserIdInBody.code(), "USER_ID_NOT_ALLOWED");
        assert_eq!(ValidationError::MissingTitre.code(), "MISSING_TITRE");
        assert_eq!(ValidationError::MissingGenerateSujet.code(), "MISSING_SUJET");
        assert_eq!(
            ValidationError::InvalidVeilleIdFilter.code(),
            "INVALID_VEILLE_ID"
        );
        assert_eq!(
            ValidationError::MissingGenerateSujet.to_string(),
            "sujet is required"
        );
        assert_eq!(
            ValidationError::MissingSujet.to_string(),
            "Sujet is required"
        );
    }
}
