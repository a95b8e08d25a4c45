/// Built-in intra-state rivalry groups, keyed by state code
///
/// Team identifiers are the slugs used in ogol.com.br team URLs.
pub const BUILTIN_GROUPS: &[(&str, &[&str])] = &[
    (
        "SP",
        &[
            "sao-paulo",
            "palmeiras",
            "corinthians",
            "santos",
            "portuguesa",
            "red-bull-bragantino",
            "ponte-preta",
            "guarani",
        ],
    ),
    (
        "RJ",
        &["flamengo", "fluminense", "vasco-da-gama", "botafogo"],
    ),
    (
        "MG",
        &["atletico-mineiro", "cruzeiro", "america-mineiro"],
    ),
    ("RS", &["gremio", "internacional", "juventude"]),
    (
        "PR",
        &["athletico-paranaense", "coritiba", "parana"],
    ),
    ("BA", &["bahia", "vitoria"]),
    ("PE", &["sport", "nautico", "santa-cruz"]),
    ("CE", &["ceara", "fortaleza"]),
    (
        "GO",
        &["goias", "vila-nova", "atletico-goianiense"],
    ),
    (
        "SC",
        &["avai", "figueirense", "criciuma", "chapecoense"],
    ),
];
