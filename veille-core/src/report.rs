//! Prompt construction for generated reports. The wording is part of the
//! product: it pins the assistant persona, the subject line and the five
//! expected report sections, all in French.

/// System message sent with every generation request.
pub const SYSTEM_PROMPT: &str = "Tu es un expert en veille stratégique et analyse d'informations. \
                                 Tu fournis des analyses complètes, structurées et pertinentes en français.";

/// Build the user prompt. `sujet` and `contexte` arrive pre-trimmed from
/// validation; a blank contexte has already been dropped to `None`.
pub fn build_prompt(sujet: &str, contexte: Option<&str>) -> String {
    let mut prompt = format!(
        "Tu es un assistant spécialisé dans la veille et l'analyse d'informations. \
         \n\nSujet de la veille : {sujet}"
    );

    if let Some(contexte) = contexte {
        prompt.push_str("\n\nContexte additionnel : ");
        prompt.push_str(contexte);
    }

    prompt.push_str(
        "\n\nGénère une veille complète et détaillée sur ce sujet. La veille doit inclure :\n\
         1. Un résumé exécutif\n\
         2. Les points clés et tendances actuelles\n\
         3. Les acteurs principaux et innovations récentes\n\
         4. Les enjeux et perspectives d'avenir\n\
         5. Des recommandations pratiques\n\
         \n\
         Format la réponse de manière claire et structurée en français.",
    );

    prompt
}
