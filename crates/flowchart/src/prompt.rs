//! The instructional prompt sent to the language model.

/// Fixed prefix describing the expected JSON layout, with a worked example
/// (binary search). The user's algorithm text is appended verbatim.
pub const FLOWCHART_PROMPT: &str = r#"
Ответь только JSON без объяснений. Создай JSON для блок-схемы с ключами:
- id: уникальный идентификатор блока.
- label: текст в блоке.
- shape: форма (например, "ellipse", "parallelogram", "diamond", "box").
- edges: связи между блоками (ключи: from, to, label).

Пример JSON для алгоритма бинарного поиска:
{
  "nodes": [
    {"id": "A", "label": "Начало", "shape": "ellipse"},
    {"id": "B", "label": "Инициализация low и high", "shape": "box"},
    {"id": "C", "label": "mid = (low + high) // 2", "shape": "box"},
    {"id": "D", "label": "arr[mid] == target?", "shape": "diamond"},
    {"id": "E", "label": "Возврат mid", "shape": "box"},
    {"id": "F", "label": "arr[mid] < target?", "shape": "diamond"},
    {"id": "G", "label": "low = mid + 1", "shape": "box"},
    {"id": "H", "label": "high = mid - 1", "shape": "box"},
    {"id": "I", "label": "Элемент не найден", "shape": "box"}
  ],
  "edges": [
    {"from": "A", "to": "B", "label": "начало"},
    {"from": "B", "to": "C"},
    {"from": "C", "to": "D"},
    {"from": "D", "to": "E", "label": "Да"},
    {"from": "D", "to": "F", "label": "Нет"},
    {"from": "F", "to": "G", "label": "Да"},
    {"from": "F", "to": "H", "label": "Нет"},
    {"from": "G", "to": "C", "label": "повторить с новым low"},
    {"from": "H", "to": "C", "label": "повторить с новым high"},
    {"from": "E", "to": "I", "label": "Конец"},
    {"from": "I", "to": "I", "label": "Конец (если элемент не найден)"}
  ]
}

Сгенерируй JSON для следующего алгоритма: напиши по русски и расспиши весь алгоритм "#;

/// Builds the full prompt for `algorithm`.
pub fn build_prompt(algorithm: &str) -> String {
    let mut prompt = String::with_capacity(FLOWCHART_PROMPT.len() + algorithm.len());
    prompt.push_str(FLOWCHART_PROMPT);
    prompt.push_str(algorithm);
    prompt
}
