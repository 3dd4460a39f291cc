// [libs/core/stealth/src/dictionary.rs]
/*!
 * =================================================================
 * APARATO: BUILT-IN LEXICON (V3.0 - PRIORITY SEED)
 * CLASIFICACIÓN: CORE STEALTH (ESTRATO L1)
 * RESPONSABILIDAD: LÉXICO EMBEBIDO PARA LA PISTA 'dictionary'
 * =================================================================
 */

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Léxico embebido de etiquetas con valor comercial directo.
///
/// Sembrado con términos cortos de alta demanda; la pista 'dictionary'
/// promociona estas etiquetas al cubo de prioridad alta.
static BUILT_IN_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "app", "auto", "bank", "base", "best", "bet", "bit", "blog", "book", "box",
        "buy", "cab", "car", "card", "care", "cash", "chat", "city", "cloud", "club",
        "code", "coin", "cook", "cool", "data", "deal", "dev", "doc", "dog", "eat",
        "farm", "fast", "film", "fit", "fix", "food", "fox", "fun", "game", "gear",
        "gift", "go", "gold", "golf", "good", "grid", "grow", "help", "home", "host",
        "hot", "hub", "idea", "jet", "job", "key", "kid", "lab", "land", "law",
        "lead", "life", "link", "list", "live", "loan", "look", "map", "mark", "max",
        "media", "meet", "menu", "mind", "mint", "moon", "move", "music", "net", "new",
        "news", "next", "now", "one", "open", "page", "pay", "pet", "pick", "pin",
        "plan", "play", "plus", "point", "post", "pro", "push", "quick", "radio", "rent",
        "ride", "ring", "rock", "run", "safe", "sale", "scan", "sea", "seed", "shop",
        "site", "sky", "smart", "solar", "spot", "star", "store", "sun", "swap", "talk",
        "task", "team", "tech", "time", "tip", "top", "tour", "trade", "travel", "true",
        "vet", "view", "vote", "walk", "watch", "wave", "web", "well", "wild", "win",
        "wine", "wise", "word", "work", "world", "yard", "yes", "zen", "zip", "zone",
    ])
});

/// Pertenencia de la etiqueta (insensible a mayúsculas) al léxico embebido.
pub fn is_dictionary_word(label: &str) -> bool {
    BUILT_IN_WORDS.contains(label.to_ascii_lowercase().as_str())
}
