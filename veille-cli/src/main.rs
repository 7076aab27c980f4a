//! veille-cli - terminal client for the Veille IA HTTP API
//!
//! Browse veilles, trigger report generation and read the results from a
//! shell. Authenticates with the same bearer session tokens as any other
//! API client.
//!
//! # Subcommands
//! - `list [-n <limit>] [--search <term>]` - list your veilles
//! - `show <id>`                            - one veille with its rendered report
//! - `create <titre> <sujet> [--contexte]`  - create a veille
//! - `generate <id> [--sujet] [--contexte]` - generate the report via OpenAI
//! - `delete <id>`                          - delete a veille
//! - `historique [--veille <id>] [-n]`      - list historique entries
//! - `status`                               - show server health

use clap::{Parser, Subcommand};
use serde::Deserialize;
use veille_core::render::parse_sections;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8790";
const DEFAULT_LIST_LIMIT: u32 = 10;
const DEFAULT_HISTORIQUE_LIMIT: u32 = 50;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "veille-cli",
    version,
    about = "Veille IA terminal client"
)]
struct Cli {
    /// Veille IA HTTP server URL (overrides VEILLE_SERVER_URL env var)
    #[arg(long, env = "VEILLE_SERVER_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Bearer session token (overrides VEILLE_TOKEN env var)
    #[arg(long, env = "VEILLE_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List your veilles, newest first
    List {
        /// Maximum number of veilles to return
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,

        /// Case-insensitive substring filter on titre or sujet
        #[arg(long)]
        search: Option<String>,

        /// Output the raw JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show one veille with its report rendered in sections
    Show {
        /// Veille id
        id: i64,

        /// Output the raw JSON record
        #[arg(long)]
        json: bool,
    },

    /// Create a new veille
    Create {
        /// Title of the veille
        titre: String,

        /// Subject to research
        sujet: String,

        /// Optional free-form context
        #[arg(long)]
        contexte: Option<String>,

        /// Output the raw JSON record
        #[arg(long)]
        json: bool,
    },

    /// Generate the report for a veille via OpenAI
    Generate {
        /// Veille id
        id: i64,

        /// Override the stored sujet for this generation
        #[arg(long)]
        sujet: Option<String>,

        /// Override the stored contexte for this generation
        #[arg(long)]
        contexte: Option<String>,

        /// Output the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Delete a veille (its historique entries are kept)
    Delete {
        /// Veille id
        id: i64,
    },

    /// List historique entries, newest first
    Historique {
        /// Restrict to one veille
        #[arg(long)]
        veille: Option<i64>,

        /// Maximum number of entries to return
        #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORIQUE_LIMIT)]
        limit: u32,

        /// Output the raw JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show Veille IA server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VeilleRecord {
    pub id: i64,
    pub titre: String,
    pub sujet: String,
    pub contexte: Option<String>,
    pub resultat: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoriqueRecord {
    pub id: i64,
    pub veille_id: i64,
    pub contenu: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResult {
    pub success: bool,
    pub veille: VeilleRecord,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteResult {
    pub message: String,
    pub deleted: VeilleRecord,
}

/// Error body every endpoint shares: `{error, code}` plus an optional hint.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

// ============================================================================
// Display Formatting (pure, tested)
// ============================================================================

/// Render a stored report for the terminal. Structured text becomes titled
/// section blocks; text the parser finds no structure in is shown verbatim.
pub fn render_report(text: &str) -> String {
    let sections = parse_sections(text);
    if sections.is_empty() {
        return text.to_string();
    }

    let blocks: Vec<String> = sections
        .iter()
        .map(|section| {
            format!(
                "=== {} [{}] ===\n{}",
                section.title,
                section.category.label(),
                section.body
            )
        })
        .collect();
    blocks.join("\n\n")
}

/// One listing row: id, generation state, titre and sujet.
pub fn format_veille_row(veille: &VeilleRecord) -> String {
    let etat = if veille.resultat.is_some() {
        "généré"
    } else {
        "en attente"
    };
    format!(
        "#{}  [{}]  {} : {}",
        veille.id, etat, veille.titre, veille.sujet
    )
}

/// Single-line preview of a historique entry body, capped at `max` chars.
pub fn format_entry_preview(contenu: &str, max: usize) -> String {
    let flat = contenu.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let truncated: String = flat.chars().take(max).collect();
    format!("{}...", truncated)
}

// ============================================================================
// HTTP Plumbing
// ============================================================================

fn make_client(timeout_secs: u64) -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}

fn require_token(token: Option<String>) -> String {
    match token {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            eprintln!("veille-cli: session token required (set VEILLE_TOKEN or pass --token)");
            std::process::exit(1);
        }
    }
}

fn send(
    request: reqwest::blocking::RequestBuilder,
    url: &str,
) -> reqwest::blocking::Response {
    match request.send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("veille-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    }
}

/// Pass a successful response through; print the API error and exit on any
/// other status.
fn check(resp: reqwest::blocking::Response) -> reqwest::blocking::Response {
    if resp.status().is_success() {
        return resp;
    }

    let status = resp.status();
    let body = resp.text().unwrap_or_default();
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(api) => {
            let code = api.code.unwrap_or_else(|| status.to_string());
            let error = api.error.unwrap_or_else(|| "unknown error".to_string());
            eprintln!("veille-cli: {}: {}", code, error);
            if let Some(message) = api.message {
                eprintln!("veille-cli: {}", message);
            }
        }
        Err(_) => eprintln!("veille-cli: server returned {}: {}", status, body),
    }
    std::process::exit(1);
}

fn print_pretty(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Subcommand Implementations
// ============================================================================

fn do_list(
    server: &str,
    token: &str,
    limit: u32,
    search: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let client = make_client(30)?;
    let url = format!("{}/veille", server);

    let mut request = client
        .get(&url)
        .bearer_auth(token)
        .query(&[("limit", limit.to_string())]);
    if let Some(term) = search {
        request = request.query(&[("search", term)]);
    }

    let resp = check(send(request, &url));

    if json {
        let value: serde_json::Value = resp.json()?;
        return print_pretty(&value);
    }

    let veilles: Vec<VeilleRecord> = resp.json()?;
    if veilles.is_empty() {
        println!("Aucune veille.");
        return Ok(());
    }
    for veille in &veilles {
        println!("{}", format_veille_row(veille));
    }
    Ok(())
}

fn fetch_veille(server: &str, token: &str, id: i64) -> anyhow::Result<VeilleRecord> {
    let client = make_client(30)?;
    let url = format!("{}/veille/{}", server, id);
    let resp = check(send(client.get(&url).bearer_auth(token), &url));
    Ok(resp.json()?)
}

fn do_show(server: &str, token: &str, id: i64, json: bool) -> anyhow::Result<()> {
    let client = make_client(30)?;
    let url = format!("{}/veille/{}", server, id);
    let resp = check(send(client.get(&url).bearer_auth(token), &url));

    if json {
        let value: serde_json::Value = resp.json()?;
        return print_pretty(&value);
    }

    let veille: VeilleRecord = resp.json()?;
    println!("Veille #{} : {}", veille.id, veille.titre);
    println!("Sujet    : {}", veille.sujet);
    if let Some(contexte) = &veille.contexte {
        println!("Contexte : {}", contexte);
    }
    println!("Créée    : {}", veille.created_at);
    println!("Modifiée : {}", veille.updated_at);
    println!();

    match &veille.resultat {
        Some(resultat) => println!("{}", render_report(resultat)),
        None => println!(
            "Aucun rapport généré. Lancez : veille-cli generate {}",
            veille.id
        ),
    }
    Ok(())
}

fn do_create(
    server: &str,
    token: &str,
    titre: &str,
    sujet: &str,
    contexte: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let client = make_client(30)?;
    let url = format!("{}/veille", server);

    let mut body = serde_json::json!({ "titre": titre, "sujet": sujet });
    if let Some(contexte) = contexte {
        body["contexte"] = contexte.into();
    }

    let resp = check(send(client.post(&url).bearer_auth(token).json(&body), &url));

    if json {
        let value: serde_json::Value = resp.json()?;
        return print_pretty(&value);
    }

    let veille: VeilleRecord = resp.json()?;
    println!("Veille #{} créée : {}", veille.id, veille.titre);
    Ok(())
}

fn do_generate(
    server: &str,
    token: &str,
    id: i64,
    sujet_override: Option<String>,
    contexte_override: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    // Reuse the stored sujet/contexte unless overridden on the command line.
    let veille = fetch_veille(server, token, id)?;
    let sujet = sujet_override.unwrap_or(veille.sujet);
    let contexte = contexte_override.or(veille.contexte);

    let mut body = serde_json::json!({ "veilleId": id, "sujet": sujet });
    if let Some(contexte) = contexte {
        body["contexte"] = contexte.into();
    }

    eprintln!("Génération du rapport en cours...");

    // Generation waits on OpenAI; give it a generous timeout.
    let client = make_client(120)?;
    let url = format!("{}/generate-veille", server);
    let resp = check(send(client.post(&url).bearer_auth(token).json(&body), &url));

    if json {
        let value: serde_json::Value = resp.json()?;
        return print_pretty(&value);
    }

    let result: GenerateResult = resp.json()?;
    if !result.success {
        anyhow::bail!("generation reported failure");
    }
    println!("Rapport généré pour la veille #{} :", result.veille.id);
    println!();
    println!("{}", render_report(&result.content));
    Ok(())
}

fn do_delete(server: &str, token: &str, id: i64) -> anyhow::Result<()> {
    let client = make_client(30)?;
    let url = format!("{}/veille/{}", server, id);
    let resp = check(send(client.delete(&url).bearer_auth(token), &url));

    let result: DeleteResult = resp.json()?;
    println!(
        "{} (#{} {})",
        result.message, result.deleted.id, result.deleted.titre
    );
    Ok(())
}

fn do_historique(
    server: &str,
    token: &str,
    veille: Option<i64>,
    limit: u32,
    json: bool,
) -> anyhow::Result<()> {
    let client = make_client(30)?;
    let url = format!("{}/historique", server);

    let mut request = client
        .get(&url)
        .bearer_auth(token)
        .query(&[("limit", limit.to_string())]);
    if let Some(veille_id) = veille {
        request = request.query(&[("veilleId", veille_id.to_string())]);
    }

    let resp = check(send(request, &url));

    if json {
        let value: serde_json::Value = resp.json()?;
        return print_pretty(&value);
    }

    let entries: Vec<HistoriqueRecord> = resp.json()?;
    if entries.is_empty() {
        println!("Aucune entrée d'historique.");
        return Ok(());
    }
    for entry in &entries {
        println!(
            "#{}  veille #{}  {}",
            entry.id, entry.veille_id, entry.created_at
        );
        println!("    {}", format_entry_preview(&entry.contenu, 120));
    }
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = make_client(10)?;
    let url = format!("{}/health", server);
    let resp = send(client.get(&url), &url);

    if resp.status().is_success() {
        let body: serde_json::Value = resp.json().unwrap_or_default();
        println!(
            "Veille IA server: {}",
            body["status"].as_str().unwrap_or("unknown")
        );
        println!("Version:          {}", body["version"].as_str().unwrap_or("?"));
        println!(
            "PostgreSQL:       {}",
            body["postgresql"].as_str().unwrap_or("?")
        );
    } else {
        let status = resp.status();
        eprintln!("veille-cli: server unhealthy (HTTP {})", status);
        std::process::exit(1);
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::List { limit, search, json } => {
            let token = require_token(cli.token);
            do_list(&server, &token, limit, search.as_deref(), json)
        }
        Commands::Show { id, json } => {
            let token = require_token(cli.token);
            do_show(&server, &token, id, json)
        }
        Commands::Create {
            titre,
            sujet,
            contexte,
            json,
        } => {
            let token = require_token(cli.token);
            do_create(&server, &token, &titre, &sujet, contexte.as_deref(), json)
        }
        Commands::Generate {
            id,
            sujet,
            contexte,
            json,
        } => {
            let token = require_token(cli.token);
            do_generate(&server, &token, id, sujet, contexte, json)
        }
        Commands::Delete { id } => {
            let token = require_token(cli.token);
            do_delete(&server, &token, id)
        }
        Commands::Historique { veille, limit, json } => {
            let token = require_token(cli.token);
            do_historique(&server, &token, veille, limit, json)
        }
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("veille-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_veille(id: i64, resultat: Option<&str>) -> VeilleRecord {
        VeilleRecord {
            id,
            titre: "Veille IA".to_string(),
            sujet: "LLM en santé".to_string(),
            contexte: None,
            resultat: resultat.map(str::to_string),
            created_at: "2026-08-20T10:00:00Z".to_string(),
            updated_at: "2026-08-20T10:00:00Z".to_string(),
        }
    }

    // ========================================================================
    // TEST 1: structured reports render as titled section blocks
    // ========================================================================
    #[test]
    fn test_render_report_structured() {
        let text = "1. Résumé exécutif\nLe marché bouge.\n\n2. Recommandations pratiques\nAgir vite.";
        let rendered = render_report(text);

        assert!(rendered.contains("=== Résumé exécutif [Synthèse] ==="));
        assert!(rendered.contains("Le marché bouge."));
        assert!(rendered.contains("=== Recommandations pratiques [Recommandations] ==="));
        assert!(rendered.contains("Agir vite."));
    }

    // ========================================================================
    // TEST 2: unstructured text falls back to verbatim output
    // ========================================================================
    #[test]
    fn test_render_report_unstructured_verbatim() {
        let text = "Texte libre sans aucune structure particulière.";
        // The parser wraps loose prose in an implicit Introduction section.
        let rendered = render_report(text);
        assert!(rendered.contains("Texte libre sans aucune structure particulière."));

        // Truly empty input comes back untouched.
        assert_eq!(render_report(""), "");
        assert_eq!(render_report("   \n  "), "   \n  ");
    }

    // ========================================================================
    // TEST 3: listing rows show id, state, titre and sujet
    // ========================================================================
    #[test]
    fn test_format_veille_row() {
        let pending = format_veille_row(&mock_veille(12, None));
        assert!(pending.starts_with("#12"));
        assert!(pending.contains("[en attente]"));
        assert!(pending.contains("Veille IA : LLM en santé"));

        let done = format_veille_row(&mock_veille(7, Some("rapport")));
        assert!(done.contains("[généré]"));
    }

    // ========================================================================
    // TEST 4: historique previews are single-line and capped
    // ========================================================================
    #[test]
    fn test_format_entry_preview() {
        assert_eq!(
            format_entry_preview("ligne un\nligne   deux", 120),
            "ligne un ligne deux"
        );

        let long = "mot ".repeat(100);
        let preview = format_entry_preview(&long, 20);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 23);

        assert_eq!(format_entry_preview("court", 120), "court");
    }

    // ========================================================================
    // TEST 5: API records deserialize from camelCase payloads
    // ========================================================================
    #[test]
    fn test_records_deserialize_camel_case() {
        let veille: VeilleRecord = serde_json::from_str(
            r#"{
                "id": 3,
                "userId": "u1",
                "titre": "T",
                "sujet": "S",
                "contexte": null,
                "resultat": "R",
                "createdAt": "2026-08-20T10:00:00Z",
                "updatedAt": "2026-08-21T09:30:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(veille.id, 3);
        assert_eq!(veille.resultat.as_deref(), Some("R"));
        assert_eq!(veille.updated_at, "2026-08-21T09:30:00Z");

        let entry: HistoriqueRecord = serde_json::from_str(
            r#"{
                "id": 9,
                "veilleId": 3,
                "userId": "u1",
                "contenu": "rapport",
                "createdAt": "2026-08-21T09:30:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(entry.veille_id, 3);
        assert_eq!(entry.contenu, "rapport");
    }
}
