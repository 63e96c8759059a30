pub const GENERAL: &str = "general";

/// Upper bound on derived keywords; each one costs a provider call.
pub const MAX_RELATED_KEYWORDS: usize = 10;

const GENERAL_KEYWORDS: [&str; 4] = ["business", "services", "company", "local business"];

pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "restaurant",
        &[
            "restaurant",
            "dining",
            "food",
            "eatery",
            "bistro",
            "cafe",
            "takeout",
            "delivery",
            "fast food",
            "fine dining",
        ],
    ),
    (
        "marketing",
        &[
            "marketing agency",
            "digital marketing",
            "advertising agency",
            "web design",
            "seo services",
            "social media marketing",
            "marketing consultant",
            "branding agency",
            "ppc management",
        ],
    ),
    (
        "healthcare",
        &[
            "doctor",
            "physician",
            "medical clinic",
            "healthcare",
            "family doctor",
            "primary care",
            "medical services",
            "clinic",
            "health center",
        ],
    ),
    (
        "dental",
        &[
            "dentist",
            "dental clinic",
            "dental care",
            "orthodontist",
            "dental services",
            "teeth cleaning",
            "oral health",
            "family dentist",
            "cosmetic dentist",
        ],
    ),
    (
        "legal",
        &[
            "lawyer",
            "attorney",
            "law firm",
            "legal services",
            "personal injury lawyer",
            "divorce attorney",
            "criminal lawyer",
            "business lawyer",
            "legal counsel",
        ],
    ),
    (
        "automotive",
        &[
            "auto repair",
            "car service",
            "mechanic",
            "automotive",
            "car maintenance",
            "brake service",
            "oil change",
            "auto shop",
            "car repair",
        ],
    ),
    (
        "beauty",
        &[
            "hair salon",
            "beauty salon",
            "barber shop",
            "spa",
            "nail salon",
            "hair stylist",
            "beauty services",
            "massage therapy",
            "skincare",
        ],
    ),
    (
        "fitness",
        &[
            "gym",
            "fitness center",
            "personal trainer",
            "yoga studio",
            "pilates",
            "crossfit",
            "fitness classes",
            "health club",
            "workout facility",
        ],
    ),
    (
        "real_estate",
        &[
            "real estate",
            "realtor",
            "real estate agent",
            "property management",
            "home sales",
            "real estate broker",
            "property sales",
            "real estate services",
            "home buying",
        ],
    ),
    (
        "home_services",
        &[
            "plumber",
            "electrician",
            "hvac",
            "contractor",
            "home repair",
            "handyman",
            "roofing",
            "flooring",
            "painting",
            "landscaping",
        ],
    ),
];

/// Category tags for a business, in table order. Never empty: falls back to `general`.
pub fn detect_categories(types: &[String], name: &str) -> Vec<&'static str> {
    let name = name.trim().to_lowercase();
    let first_token = name.split_whitespace().next().unwrap_or("");
    let types: Vec<String> = types
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut out = Vec::new();
    for (category, keywords) in CATEGORY_KEYWORDS {
        let type_match = types.iter().any(|t| {
            keywords.iter().any(|kw| {
                let kw = kw.replace(' ', "_");
                t.contains(&kw) || kw.contains(t.as_str())
            })
        });

        let name_match = keywords.iter().any(|kw| {
            name.contains(kw) || (!first_token.is_empty() && kw.contains(first_token))
        });

        if type_match || name_match {
            out.push(*category);
        }
    }

    if out.is_empty() {
        out.push(GENERAL);
    }
    out
}

/// Keywords of the given categories, deduplicated, capped at `MAX_RELATED_KEYWORDS`.
pub fn related_keywords(categories: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |kw: &str| {
        if !out.iter().any(|k| k == kw) {
            out.push(kw.to_string());
        }
    };

    for category in categories {
        if let Some((_, keywords)) = CATEGORY_KEYWORDS.iter().find(|(c, _)| c == category) {
            keywords.iter().for_each(|kw| push(kw));
        }
    }

    if categories.contains(&GENERAL) {
        GENERAL_KEYWORDS.iter().for_each(|kw| push(kw));
    }

    out.truncate(MAX_RELATED_KEYWORDS);
    out
}
