// 🏷️ Classifier - description → (category, brand)
//
// An ordered, first-match-wins cascade. Most rules were added one at a time
// to fix a real mis-filing, so several overlap and a few repeat further down
// as safety nets. Order is behavior: moving a rule changes results for
// ambiguous descriptions.
//
// Brand resolution is separate from the category cascade and runs against an
// explicit ordered token list, first word of the description first.

use crate::catalog::{GENERAL_SUBCATEGORY, OTHER_CATEGORY};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid regex literal {pattern}: {err}"))
}

/// Keywords that must stand alone: not glued to a letter or digit on either
/// side. Works for tokens like "f+" or "type-c" where `\b` does not.
fn standalone_words(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    compile_regex(&format!(r"(?:^|[^\p{{L}}\p{{N}}])(?:{alternation})(?:[^\p{{L}}\p{{N}}]|$)"))
}

// ============================================================================
// PATTERNS
// ============================================================================

static AIR_PURIFIER: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"purifier|очиститель воздуха|воздухоочистител"));

static STEAM_DECK: Lazy<Regex> = Lazy::new(|| compile_regex(r"steam\s?deck"));

static TV_BOX: Lazy<Regex> = Lazy::new(|| {
    compile_regex(r"tv[\s-]?box|android[\s-]?tv|\bmi\s?box\b|тв[\s-]?приставк|смарт[\s-]?приставк")
});

static HEADPHONES: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"\b(?:наушник\w*|гарнитур\w*|airpods|air\s?pods?|earpods|ear\s?pods?|earphones?|earbuds?|buds\d*|freebuds|headphones?|wh-1000xm\d|wf-1000xm\d|powerbeats|marshall\s(?:minor|major|motif))\b",
    )
});

static TABLET_WORDS: Lazy<Regex> = Lazy::new(|| compile_regex(r"ipad|\btab\b|tablet|планшет"));

static TABLET_WORDS_STRICT: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"\b(?:ipad|tab|tablet|pad)\b"));

/// "pad" as a device: not followed by a latin letter. The prefix glued in
/// front is captured so laptop lines and peripherals can be ruled out.
static PAD: Lazy<Regex> = Lazy::new(|| compile_regex(r"(\p{L}*)pad(?:[^a-z]|$)"));

const PAD_FALSE_PREFIXES: [&str; 8] = ["note", "think", "idea", "touch", "mouse", "game", "key", "track"];

static ACCESSORIES: Lazy<Regex> = Lazy::new(|| {
    standalone_words(&[
        "аксессуар", "чехол", "стекло", "защитное стекло", "кабель", "шнур", "переходник",
        "адаптер", "adapter", "зарядка", "зарядное устройство", "сзу", "блок питания",
        "powerbank", "power bank", "magsafe", "pencil", "stylus", "стилус", "cover",
        "screen protector", "пленка", "плёнка", "film", "док-станция", "hub", "разветвитель",
        "splitter", "держатель", "holder", "mount", "подставка", "ремешок", "strap",
        "charger", "cable", "type-c",
    ])
});

/// "case" alone is an accessory, except in watch descriptions ("Aluminium Case")
static CASE_WORD: Lazy<Regex> = Lazy::new(|| compile_regex(r"\bcase\b"));
static WATCH_WORD: Lazy<Regex> = Lazy::new(|| compile_regex(r"\bwatch\b"));

static SPEAKERS: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"\b(?:колонк\w*|speakers?|boombox\s?\d*|partybox|stanmore|woburn|acton|emberton|soundbar|саундбар|яндекс\s?станци\w*|sberboom)\b",
    )
});

static SPEAKER_EXCLUSIONS: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"наушник|buds|earbuds|гарнитур|headphone"));

static HAIR_STYLERS: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"\bфен|стайлер|hair\s?dryer|styler|airwrap|supersonic|airstrait|hd-?08|hd-?16|hs-?08|ht-?01|выпрямител|straightener|плойк|curler",
    )
});

static VACUUMS: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"пылесос|vacuum|submarine|roborock|ecovacs|dreame|dyson"));

static WATCHES: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"\b(?:часы|смарт-часы|watch|band|galaxy\sfit\d*|fitbit|amazfit|gtr|gt[345]|instinct|forerunner|fenix|coros|garmin)\b",
    )
});

static LAPTOP_LINES: Lazy<Regex> = Lazy::new(|| {
    standalone_words(&[
        "ноутбук", "laptop", "notebook", "matebook", "magicbook", "ultrabook", "chromebook",
        "aspire", "ideapad", "thinkpad", "thinkbook", "vivobook", "zenbook", "expertbook",
        "legion", "predator", "nitro", "omen", "pavilion", "victus", "inspiron", "latitude",
        "xps", "gigabyte", "machenike", "msi",
    ])
});

/// Handheld consoles sold under laptop lines
static HANDHELD_CONSOLES: Lazy<Regex> = Lazy::new(|| compile_regex(r"rog\s?ally|legion\s?go|msi\s?claw"));

static INCH_SIZE: Lazy<Regex> =
    Lazy::new(|| compile_regex(r#"\d{2}(?:[.,]\d)?\s?(?:"|''|”|″|inch|дюйм)"#));

static CPU: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"intel|amd|ryzen|core\s?i[3579]|core\sultra|pentium|celeron"));

static MATE: Lazy<Regex> = Lazy::new(|| compile_regex(r"\bmate(?:[^a-zа-я]|x\d|$)"));

static MATE_LINES: Lazy<Regex> = Lazy::new(|| compile_regex(r"matebook|matepad"));

static PHONES: Lazy<Regex> = Lazy::new(|| {
    standalone_words(&[
        "iphone", "смартфон", "smartphone", "galaxy", "pixel", "zenfone", "oneplus", "realme",
        "zte", "redmi", "poco", "xiaomi", "samsung", "huawei", "honor", "nothing phone",
        "tecno", "infinix", "vivo", "oppo", "motorola",
    ])
});

static FEATURE_PHONES: Lazy<Regex> = Lazy::new(|| {
    standalone_words(&[
        "кнопочный", "button phone", "feature phone", "nokia", "f+", "philips xenium", "texet",
    ])
});

static RUGGED_PHONES: Lazy<Regex> = Lazy::new(|| {
    standalone_words(&[
        "противоударный", "rugged", "armor", "tank", "cyber", "mega", "blackview", "doogee",
        "oukitel", "unihertz", "ulefone", "hotwav",
    ])
});

static VR_HEADSETS: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"\b(?:oculus|meta\s?quest|quest\s?\d|vr\d?|vr\s?headset|vr\s?шлем|шлем виртуальной реальности|pico\s?\d|vision\s?pro|ps\s?vr\s?\d?|psvr\d?)\b",
    )
});

static GAME_CONSOLES: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"playstation|\bps\s?[45]\b|xbox|nintendo|\bswitch\b|джойстик|геймпад|gamepad|dualsense|dualshock|игровая консоль|игровая приставка|rog\s?ally|legion\s?go|msi\s?claw",
    )
});

static SECURITY_CAMERAS: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"ip[\s-]?камер|камера видеонаблюдения|видеонаблюдени|security\s?camera|ip\s?camera|видеоняня|baby\s?monitor|\bimou\b|\bezviz\b|\btapo\sc\d+",
    )
});

static DRONES: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"\b(?:дрон\w*|квадрокоптер\w*|drones?|quadcopter|mavic|avata|dji\s(?:mini|air|flip|neo))\b",
    )
});

static POWER_TOOLS: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"\b(?:дрель|шуруповерт|шуруповёрт|перфоратор|болгарка|лобзик|гайковерт|гайковёрт|drill|screwdriver|impact\sdriver|angle\sgrinder|makita|dewalt|hilti)\b",
    )
});

static GRILLS: Lazy<Regex> = Lazy::new(|| compile_regex(r"гриль|grill|барбекю|\bbbq\b"));

static RAZORS: Lazy<Regex> = Lazy::new(|| {
    compile_regex(r"бритв|триммер|trimmer|shaver|\brazor|oneblade|машинка для стрижки|clipper")
});

static EPILATORS: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"эпилятор|epilator|silk-?[eé]pil|\bipl\b"));

static TOOTHBRUSHES: Lazy<Regex> = Lazy::new(|| {
    compile_regex(r"зубная\sщ[её]тка|электрическая\sщ[её]тка|toothbrush|oral-b|sonicare")
});

static GOPRO: Lazy<Regex> = Lazy::new(|| compile_regex(r"gopro|go\spro|\bhero\s?\d+"));

static ACTION_CAMERAS: Lazy<Regex> = Lazy::new(|| {
    compile_regex(r"osmo\saction|osmo\spocket|insta\s?360|\bdji\b|\baction\s?[45]\b")
});

// ============================================================================
// RULE TABLES
// ============================================================================

/// Last-resort table: first category with any substring hit wins
const FALLBACK_KEYWORDS: &[(&str, &[&str])] = &[
    ("Rugged phones", &["blackview", "doogee", "oukitel", "unihertz", "rugged", "armor", "tank", "cyber", "mega"]),
    ("Feature phones", &["nokia", "f+", "button phone", "feature phone"]),
    ("Game consoles", &["playstation", "ps4", "ps5", "xbox", "switch", "steam deck", "джойстик", "игровая консоль"]),
    ("Action cameras", &["gopro", "hero"]),
    ("Vacuum cleaners", &["пылесос", "vacuum", "робот-пылесос", "dyson", "dreame", "submarine"]),
    ("Tablets", &["ipad", " galaxy tab", "tab ", "redmi pad", "poco pad", "tablet", "pad "]),
    ("Laptops", &["ноутбук", "macbook", "magicbook", "matebook", "redmi book", "aspire", "ideapad", "ultrabook", "chromebook"]),
    ("Speakers", &["колонка", "speaker", "jbl", "marshall", "sber", "яндекс", "boombox", "partybox", "stanmore", "woburn", "макс"]),
    ("Headphones", &["наушник", "airpods", "buds", "earphones", "earbuds", "sony wh-", "jbl tune", "marshall minor", "marshall major", "гарнитура"]),
    ("Watches", &["часы", "watch", "smart band", "galaxy fit", "fitbit", "amazfit", "gtr", "gt3"]),
    ("Phones", &["iphone", "samsung", "x.mi", "x.poco", "x.redmi", "honor", "google pixel", "zte", "realme", "oneplus", "asus zenfone", "смартфон", "smartphone", "galaxy"]),
    ("Accessories", &["сзу", "сетевое зарядное устройство", "кабель", "переходник", "pencil", "keyboard", "mouse", "adapter", "magsafe", "беспроводная зарядка", "powerbank", "power bank", "чехол", "case", "cover"]),
];

/// Brand tokens in priority order. Product lines come before the maker's
/// own name, and the loose Xiaomi token "mi " is last.
const BRAND_TOKENS: &[(&str, &str)] = &[
    ("macbook", "Apple"),
    ("imac", "Apple"),
    ("ipad", "Apple"),
    ("iphone", "Apple"),
    ("airpods", "Apple"),
    ("apple", "Apple"),
    ("galaxy", "Samsung"),
    ("samsung", "Samsung"),
    ("xiaomi", "Xiaomi"),
    ("redmi", "Xiaomi"),
    ("poco", "Xiaomi"),
    ("mijia", "Xiaomi"),
    ("magicbook", "HONOR"),
    ("honor", "HONOR"),
    ("matebook", "Huawei"),
    ("matepad", "Huawei"),
    ("huawei", "Huawei"),
    ("google", "Google"),
    ("pixel", "Google"),
    ("zte", "ZTE"),
    ("realme", "Realme"),
    ("oneplus", "OnePlus"),
    ("zenfone", "ASUS"),
    ("vivobook", "ASUS"),
    ("zenbook", "ASUS"),
    ("asus", "ASUS"),
    ("ideapad", "Lenovo"),
    ("thinkpad", "Lenovo"),
    ("legion", "Lenovo"),
    ("lenovo", "Lenovo"),
    ("acer", "Acer"),
    ("gigabyte", "Gigabyte"),
    ("machenike", "Machenike"),
    ("jbl", "JBL"),
    ("marshall", "Marshall"),
    ("playstation", "SONY"),
    ("sony", "SONY"),
    ("sber", "Sber"),
    ("яндекс", "Яндекс"),
    ("dyson", "Dyson"),
    ("dreame", "Dreame"),
    ("roborock", "Roborock"),
    ("nokia", "Nokia"),
    ("f+", "F+"),
    ("blackview", "Blackview"),
    ("doogee", "DOOGEE"),
    ("oukitel", "OUKITEL"),
    ("unihertz", "Unihertz"),
    ("gopro", "GoPro"),
    ("garmin", "Garmin"),
    ("fitbit", "Fitbit"),
    ("amazfit", "Amazfit"),
    ("insta360", "Insta360"),
    ("dji", "DJI"),
    ("osmo", "DJI"),
    ("insta", "Insta360"),
    ("oculus", "Oculus"),
    ("quest", "Oculus"),
    ("xbox", "Microsoft"),
    ("nintendo", "Nintendo"),
    ("philips", "Philips"),
    ("braun", "Braun"),
    ("oral-b", "Oral-B"),
    ("makita", "Makita"),
    ("dewalt", "DeWALT"),
    ("mi ", "Xiaomi"),
];

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// Prepared input shared by every predicate
#[derive(Debug, Clone)]
pub struct Subject {
    pub raw: String,
    pub lower: String,
}

impl Subject {
    pub fn new(description: &str) -> Self {
        Subject {
            raw: description.to_string(),
            lower: description.to_lowercase(),
        }
    }
}

pub type Predicate = fn(&Subject) -> bool;

/// How a matching rule names the subcategory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandPolicy {
    /// Look the brand up in the token list
    Resolve,
    /// The rule fixes the subcategory itself
    Fixed(&'static str),
}

/// One step of the cascade
#[derive(Debug, Clone)]
pub struct CascadeRule {
    pub id: &'static str,
    pub category: &'static str,
    pub brand: BrandPolicy,
    predicate: Predicate,
}

impl CascadeRule {
    pub fn new(id: &'static str, category: &'static str, brand: BrandPolicy, predicate: Predicate) -> Self {
        CascadeRule {
            id,
            category,
            brand,
            predicate,
        }
    }

    pub fn matches(&self, subject: &Subject) -> bool {
        (self.predicate)(subject)
    }
}

fn pad_device(lower: &str) -> bool {
    if lower.contains("notepad") {
        return false;
    }
    PAD.captures_iter(lower).any(|caps| {
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        !PAD_FALSE_PREFIXES.contains(&prefix)
    })
}

fn is_accessory(lower: &str) -> bool {
    ACCESSORIES.is_match(lower) || (CASE_WORD.is_match(lower) && !WATCH_WORD.is_match(lower))
}

fn mentions_brand(lower: &str) -> bool {
    BRAND_TOKENS.iter().any(|(token, _)| lower.contains(token))
}

/// The standard cascade, in evaluation order
pub fn standard_rules() -> Vec<CascadeRule> {
    use BrandPolicy::{Fixed, Resolve};

    vec![
        // Special cases first
        CascadeRule::new("air-purifier", "Air purifiers", Resolve, |s| AIR_PURIFIER.is_match(&s.lower)),
        CascadeRule::new("steam-deck", "Game consoles", Fixed("Steam Deck"), |s| STEAM_DECK.is_match(&s.lower)),
        // TV boxes share brand names with phones; keep them out of Phones
        CascadeRule::new("tv-box-exclusion", OTHER_CATEGORY, Resolve, |s| {
            TV_BOX.is_match(&s.lower) && (PHONES.is_match(&s.lower) || mentions_brand(&s.lower))
        }),
        // Category cascade
        CascadeRule::new("headphones", "Headphones", Resolve, |s| HEADPHONES.is_match(&s.lower)),
        CascadeRule::new("tablets", "Tablets", Resolve, |s| {
            TABLET_WORDS.is_match(&s.lower) || pad_device(&s.lower)
        }),
        CascadeRule::new("accessories", "Accessories", Resolve, |s| is_accessory(&s.lower)),
        CascadeRule::new("speakers", "Speakers", Resolve, |s| {
            SPEAKERS.is_match(&s.lower) && !SPEAKER_EXCLUSIONS.is_match(&s.lower)
        }),
        CascadeRule::new("hair-stylers", "Hair stylers", Resolve, |s| HAIR_STYLERS.is_match(&s.lower)),
        CascadeRule::new("vacuum-cleaners", "Vacuum cleaners", Resolve, |s| VACUUMS.is_match(&s.lower)),
        CascadeRule::new("watches", "Watches", Resolve, |s| WATCHES.is_match(&s.lower)),
        CascadeRule::new("tablets-again", "Tablets", Resolve, |s| {
            (TABLET_WORDS_STRICT.is_match(&s.lower) && !s.lower.contains("notepad")) || pad_device(&s.lower)
        }),
        CascadeRule::new("laptops-macbook", "Laptops", Fixed("Apple"), |s| s.lower.contains("macbook")),
        CascadeRule::new("laptops-book-size", "Laptops", Resolve, |s| {
            s.lower.contains("book") && INCH_SIZE.is_match(&s.lower)
        }),
        CascadeRule::new("laptops-lines", "Laptops", Resolve, |s| {
            LAPTOP_LINES.is_match(&s.lower) && !HANDHELD_CONSOLES.is_match(&s.lower)
        }),
        CascadeRule::new("laptops-cpu-size", "Laptops", Resolve, |s| {
            CPU.is_match(&s.lower) && INCH_SIZE.is_match(&s.lower)
        }),
        CascadeRule::new("phones-huawei-mate", "Phones", Fixed("Huawei"), |s| {
            MATE.is_match(&s.lower) && !MATE_LINES.is_match(&s.lower)
        }),
        CascadeRule::new("phones", "Phones", Resolve, |s| PHONES.is_match(&s.lower)),
        CascadeRule::new("feature-phones", "Feature phones", Resolve, |s| FEATURE_PHONES.is_match(&s.lower)),
        CascadeRule::new("rugged-phones", "Rugged phones", Resolve, |s| RUGGED_PHONES.is_match(&s.lower)),
        CascadeRule::new("vr-headsets", "VR headsets", Resolve, |s| VR_HEADSETS.is_match(&s.lower)),
        CascadeRule::new("game-consoles", "Game consoles", Resolve, |s| GAME_CONSOLES.is_match(&s.lower)),
        CascadeRule::new("security-cameras", "Security cameras", Resolve, |s| {
            SECURITY_CAMERAS.is_match(&s.lower)
        }),
        CascadeRule::new("drones", "Drones", Resolve, |s| DRONES.is_match(&s.lower)),
        CascadeRule::new("power-tools", "Power tools", Resolve, |s| POWER_TOOLS.is_match(&s.lower)),
        CascadeRule::new("grills", "Grills", Resolve, |s| GRILLS.is_match(&s.lower)),
        CascadeRule::new("razors-trimmers", "Razors & trimmers", Resolve, |s| RAZORS.is_match(&s.lower)),
        CascadeRule::new("epilators", "Epilators", Resolve, |s| EPILATORS.is_match(&s.lower)),
        CascadeRule::new("toothbrushes", "Electric toothbrushes", Resolve, |s| {
            TOOTHBRUSHES.is_match(&s.lower)
        }),
        CascadeRule::new("action-cameras-gopro", "Action cameras", Fixed("GoPro"), |s| GOPRO.is_match(&s.lower)),
        CascadeRule::new("action-cameras", "Action cameras", Resolve, |s| ACTION_CAMERAS.is_match(&s.lower)),
        CascadeRule::new("hair-stylers-again", "Hair stylers", Resolve, |s| HAIR_STYLERS.is_match(&s.lower)),
        CascadeRule::new("vacuum-cleaners-again", "Vacuum cleaners", Resolve, |s| VACUUMS.is_match(&s.lower)),
    ]
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Rule id reported when the keyword table decided
pub const FALLBACK_RULE: &str = "fallback-keywords";

/// Rule id reported when nothing matched
pub const DEFAULT_RULE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: String,
    pub subcategory: String,
    pub rule_id: &'static str,
}

impl Classification {
    pub fn into_pair(self) -> (String, String) {
        (self.category, self.subcategory)
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct Classifier {
    rules: Vec<CascadeRule>,
    fallback: &'static [(&'static str, &'static [&'static str])],
    brands: &'static [(&'static str, &'static str)],
}

impl Classifier {
    /// Classifier with the standard rule set
    pub fn new() -> Self {
        Classifier {
            rules: standard_rules(),
            fallback: FALLBACK_KEYWORDS,
            brands: BRAND_TOKENS,
        }
    }

    /// Never fails; unmatched descriptions land in ("Other", "General")
    pub fn classify(&self, description: &str) -> (String, String) {
        self.explain(description).into_pair()
    }

    /// Classify and report which rule decided
    pub fn explain(&self, description: &str) -> Classification {
        let subject = Subject::new(description);

        for rule in &self.rules {
            if rule.matches(&subject) {
                let subcategory = match rule.brand {
                    BrandPolicy::Fixed(brand) => brand.to_string(),
                    BrandPolicy::Resolve => self.brand_or_general(&subject),
                };
                tracing::debug!(rule = rule.id, description, "cascade rule matched");
                return Classification {
                    category: rule.category.to_string(),
                    subcategory,
                    rule_id: rule.id,
                };
            }
        }

        let fallback = self
            .fallback
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| subject.lower.contains(kw)))
            .map(|(category, _)| *category);

        Classification {
            category: fallback.unwrap_or(OTHER_CATEGORY).to_string(),
            subcategory: self.brand_or_general(&subject),
            rule_id: if fallback.is_some() { FALLBACK_RULE } else { DEFAULT_RULE },
        }
    }

    /// Brand for a description: exact first-word hit, else the first token
    /// (in priority order) found anywhere in the text.
    pub fn resolve_brand(&self, description: &str) -> Option<&'static str> {
        self.resolve_subject_brand(&Subject::new(description))
    }

    pub fn rules(&self) -> &[CascadeRule] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn resolve_subject_brand(&self, subject: &Subject) -> Option<&'static str> {
        let first_word = subject
            .lower
            .split_whitespace()
            .next()
            .map(|w| w.trim_matches(|c: char| ",.;:\"()".contains(c)))
            .unwrap_or("");

        if !first_word.is_empty() {
            if let Some((_, brand)) = self.brands.iter().find(|(token, _)| *token == first_word) {
                return Some(brand);
            }
        }

        self.brands
            .iter()
            .find(|(token, _)| subject.lower.contains(token))
            .map(|(_, brand)| *brand)
    }

    fn brand_or_general(&self, subject: &Subject) -> String {
        self.resolve_subject_brand(subject)
            .unwrap_or(GENERAL_SUBCATEGORY)
            .to_string()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

static STANDARD: Lazy<Classifier> = Lazy::new(Classifier::new);

/// Classify with the shared standard classifier
pub fn classify(description: &str) -> (String, String) {
    STANDARD.classify(description)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(category: &str, subcategory: &str) -> (String, String) {
        (category.to_string(), subcategory.to_string())
    }

    #[test]
    fn test_reference_descriptions() {
        assert_eq!(classify("iPhone 15 Pro 256GB Black"), pair("Phones", "Apple"));
        assert_eq!(classify("MacBook Air 13\" M2 8/256"), pair("Laptops", "Apple"));
        assert_eq!(classify("Xiaomi Mi Robot Vacuum"), pair("Vacuum cleaners", "Xiaomi"));
        assert_eq!(classify("Random Unclassifiable Widget"), pair("Other", "General"));
    }

    #[test]
    fn test_empty_description() {
        assert_eq!(classify(""), pair("Other", "General"));
        assert_eq!(classify("   "), pair("Other", "General"));
    }

    #[test]
    fn test_headphones_win_over_later_rules() {
        assert_eq!(classify("Apple AirPods Pro 2 USB-C"), pair("Headphones", "Apple"));
        assert_eq!(classify("Samsung Galaxy Buds3 Pro"), pair("Headphones", "Samsung"));
        assert_eq!(classify("Наушники JBL Tune 520BT"), pair("Headphones", "JBL"));
        assert_eq!(classify("Sony WH-1000XM5"), pair("Headphones", "SONY"));
    }

    #[test]
    fn test_tablets_and_pad_false_positives() {
        assert_eq!(classify("Apple iPad Air 11 M2 128GB"), pair("Tablets", "Apple"));
        assert_eq!(classify("Xiaomi Redmi Pad SE 8/256"), pair("Tablets", "Xiaomi"));
        assert_eq!(classify("Samsung Galaxy Tab S9 FE"), pair("Tablets", "Samsung"));
        assert_eq!(classify("Huawei MatePad 11.5"), pair("Tablets", "Huawei"));
        // "pad" inside a laptop line is not a tablet
        assert_eq!(classify("Lenovo ThinkPad E14 Gen 5"), pair("Laptops", "Lenovo"));
        assert_eq!(classify("Lenovo IdeaPad Slim 3 15\""), pair("Laptops", "Lenovo"));
    }

    #[test]
    fn test_accessories() {
        assert_eq!(classify("Кабель Apple USB-C 1m"), pair("Accessories", "Apple"));
        assert_eq!(classify("Samsung 25W charger"), pair("Accessories", "Samsung"));
        assert_eq!(classify("Xiaomi Power Bank 20000"), pair("Accessories", "Xiaomi"));
        // Watch "case" describes the watch body
        assert_eq!(
            classify("Apple Watch Series 9 45mm Midnight Aluminium Case"),
            pair("Watches", "Apple")
        );
    }

    #[test]
    fn test_speakers_exclude_headphones() {
        assert_eq!(classify("JBL PartyBox 310"), pair("Speakers", "JBL"));
        assert_eq!(classify("Marshall Stanmore III"), pair("Speakers", "Marshall"));
        // No speaker word: decided by the fallback table
        assert_eq!(classify("JBL Flip 6 Black"), pair("Speakers", "JBL"));
    }

    #[test]
    fn test_hair_stylers_before_vacuums() {
        assert_eq!(classify("Dyson Airwrap Complete Long"), pair("Hair stylers", "Dyson"));
        assert_eq!(classify("Dyson Supersonic HD08"), pair("Hair stylers", "Dyson"));
        assert_eq!(classify("Dyson V15 Detect Absolute"), pair("Vacuum cleaners", "Dyson"));
    }

    #[test]
    fn test_watches() {
        assert_eq!(classify("Garmin Instinct 2 Solar"), pair("Watches", "Garmin"));
        assert_eq!(classify("Xiaomi Smart Band 9"), pair("Watches", "Xiaomi"));
    }

    #[test]
    fn test_laptops() {
        assert_eq!(classify("Huawei MateBook D 16 i5"), pair("Laptops", "Huawei"));
        assert_eq!(classify("Honor MagicBook X16"), pair("Laptops", "HONOR"));
        assert_eq!(classify("Intel Core i7 15.6\" 16/512"), pair("Laptops", "General"));
        // Handheld console under a laptop line
        assert_eq!(classify("Lenovo Legion Go 512GB"), pair("Game consoles", "Lenovo"));
    }

    #[test]
    fn test_huawei_mate_is_a_phone() {
        assert_eq!(classify("Huawei Mate X6 12/512"), pair("Phones", "Huawei"));
        assert_eq!(classify("Mate 60 Pro 12/512"), pair("Phones", "Huawei"));
    }

    #[test]
    fn test_phone_families() {
        assert_eq!(classify("Samsung Galaxy S24 Ultra 12/256"), pair("Phones", "Samsung"));
        assert_eq!(classify("Redmi Note 13 Pro 8/256"), pair("Phones", "Xiaomi"));
        assert_eq!(classify("Google Pixel 8 Pro"), pair("Phones", "Google"));
    }

    #[test]
    fn test_feature_and_rugged_phones() {
        assert_eq!(classify("Nokia 105 2023 Dual Sim"), pair("Feature phones", "Nokia"));
        assert_eq!(classify("F+ B170 Black"), pair("Feature phones", "F+"));
        assert_eq!(classify("Blackview BV9300 12/256"), pair("Rugged phones", "Blackview"));
        assert_eq!(classify("Unihertz Tank 3 Pro"), pair("Rugged phones", "Unihertz"));
    }

    #[test]
    fn test_vr_before_consoles() {
        assert_eq!(classify("Meta Quest 3 128GB"), pair("VR headsets", "Oculus"));
        assert_eq!(classify("Sony PlayStation VR2"), pair("VR headsets", "SONY"));
        assert_eq!(classify("Sony PlayStation 5 Slim"), pair("Game consoles", "SONY"));
        assert_eq!(classify("Nintendo Switch OLED"), pair("Game consoles", "Nintendo"));
    }

    #[test]
    fn test_special_cases() {
        assert_eq!(classify("Dyson Purifier Cool TP07"), pair("Air purifiers", "Dyson"));
        assert_eq!(classify("Valve Steam Deck OLED 512GB"), pair("Game consoles", "Steam Deck"));
        // TV box sharing a phone brand is pushed out of Phones
        assert_eq!(classify("Xiaomi Mi TV Box S 2nd Gen"), pair("Other", "Xiaomi"));
    }

    #[test]
    fn test_appliance_categories() {
        assert_eq!(classify("DJI Mini 4 Pro Fly More Combo"), pair("Drones", "DJI"));
        assert_eq!(classify("Makita DF333 drill"), pair("Power tools", "Makita"));
        assert_eq!(classify("Philips OneBlade 360"), pair("Razors & trimmers", "Philips"));
        assert_eq!(classify("Braun Silk-epil 9"), pair("Epilators", "Braun"));
        assert_eq!(classify("Oral-B iO 9 toothbrush"), pair("Electric toothbrushes", "Oral-B"));
        assert_eq!(classify("Tefal OptiGrill Elite"), pair("Grills", "General"));
    }

    #[test]
    fn test_action_cameras() {
        assert_eq!(classify("GoPro HERO12 Black"), pair("Action cameras", "GoPro"));
        assert_eq!(classify("HERO 11 Black Creator"), pair("Action cameras", "GoPro"));
        assert_eq!(classify("DJI Osmo Action 5 Pro"), pair("Action cameras", "DJI"));
        assert_eq!(classify("Insta360 X4"), pair("Action cameras", "Insta360"));
    }

    #[test]
    fn test_brand_priority_is_list_order() {
        let classifier = Classifier::new();
        // First word wins outright
        assert_eq!(classifier.resolve_brand("Apple cable for Samsung"), Some("Apple"));
        // Otherwise the earliest token in the list, not the earliest in the text
        assert_eq!(classifier.resolve_brand("cable for samsung and apple"), Some("Apple"));
        // "garmin" is listed before "insta", so Instinct is not Insta360
        assert_eq!(classifier.resolve_brand("Instinct 2 Garmin"), Some("Garmin"));
        assert_eq!(classifier.resolve_brand("unbranded thing"), None);
    }

    #[test]
    fn test_explain_reports_rule() {
        let classifier = Classifier::new();
        assert_eq!(classifier.explain("iPhone 15").rule_id, "phones");
        assert_eq!(classifier.explain("JBL Flip 6").rule_id, FALLBACK_RULE);
        assert_eq!(classifier.explain("Widget").rule_id, DEFAULT_RULE);
    }

    #[test]
    fn test_cascade_order_is_pinned() {
        let classifier = Classifier::new();
        let ids: Vec<&str> = classifier.rules().iter().map(|r| r.id).collect();

        let position = |id: &str| ids.iter().position(|r| *r == id).unwrap();
        assert!(position("air-purifier") < position("headphones"));
        assert!(position("headphones") < position("tablets"));
        assert!(position("tablets") < position("accessories"));
        assert!(position("accessories") < position("speakers"));
        assert!(position("watches") < position("laptops-macbook"));
        assert!(position("laptops-lines") < position("phones-huawei-mate"));
        assert!(position("vr-headsets") < position("game-consoles"));
        assert!(position("drones") < position("action-cameras"));
        assert_eq!(ids.last(), Some(&"vacuum-cleaners-again"));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("IPHONE 15 PRO"), classify("iphone 15 pro"));
    }
}
