//! User-facing texts.

/// Acknowledgement sent before the generation attempts start.
pub const IN_PROGRESS: &str = "⏳ В процессе... ";

/// Reply to a command issued inside the cooldown window.
pub const TOO_FREQUENT: &str =
    "❗ Вы слишком часто отправляете запросы. Пожалуйста, подождите немного.";

/// Reply to `/block` without an algorithm.
pub const USAGE: &str =
    "❓ Пожалуйста, укажите алгоритм после команды. Пример:\n/block ваш_алгоритм";

/// Reply when processing or delivery failed.
pub const GENERATION_FAILED: &str = "Ошибка при генерации схемы. Попробуйте в другой раз...";

/// Caption of the image produced by attempt `attempt`.
pub fn caption(attempt: flowchart::AttemptIndex) -> String {
    format!("🎉 Блок-схема {attempt}")
}
