//! User-facing replies, one per observable outcome.
//!
//! These are the only strings a conversation ever sees; they carry guidance
//! in user language and never internal identifiers or error details.

pub const COVER_RECEIVED: &str = "✅ Capa recebida. Agora envie o texto do filme.";
pub const METADATA_RECEIVED: &str = "📝 Texto recebido. Agora envie o vídeo.";
pub const SEND_COVER_FIRST: &str = "⚠️ Por favor, envie a CAPA primeiro.";
pub const SEND_METADATA_FIRST: &str =
    "⚠️ Ordem incorreta. Envie primeiro o texto com os dados do filme.";
pub const SAVING: &str = "📥 Salvando no catálogo... (isto pode levar algum tempo)";
pub const SAVED: &str = "✅ Filme salvo no catálogo!";
pub const COVER_UPLOAD_FAILED: &str =
    "❌ Falha ao salvar a capa. Envie a sequência novamente, começando pela capa.";
pub const VIDEO_UPLOAD_FAILED: &str =
    "❌ Falha ao salvar o vídeo. Envie a sequência novamente, começando pela capa.";
pub const PUBLISH_FAILED: &str =
    "❌ Falha ao registrar o filme no catálogo. Envie a sequência novamente, começando pela capa.";
pub const INTERNAL_ERROR: &str =
    "❌ Erro interno. Envie a sequência novamente, começando pela capa.";
