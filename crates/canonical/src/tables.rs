//! Built-in dictionaries. Keys are already normalized (trimmed, lowercase).

/// Name variant -> canonical display name.
pub(crate) const CANONICAL_ENTITIES: &[(&str, &str)] = &[
    ("clorox", "The Clorox Company"),
    ("clorox company", "The Clorox Company"),
    ("the clorox company", "The Clorox Company"),
    ("unilever", "Unilever"),
    ("unilever usa inc", "Unilever"),
    ("unilever usa inc.", "Unilever"),
    ("unilever plc", "Unilever"),
    ("procter and gamble", "The Procter & Gamble Company"),
    ("procter & gamble", "The Procter & Gamble Company"),
    ("p&g", "The Procter & Gamble Company"),
    ("the procter & gamble company", "The Procter & Gamble Company"),
    ("warby parker inc", "Warby Parker, Inc."),
    ("warby parker inc.", "Warby Parker, Inc."),
    ("warby parker, inc", "Warby Parker, Inc."),
    ("warby parker, inc.", "Warby Parker, Inc."),
    ("warby parker", "Warby Parker, Inc."),
    ("samsung electronics co., ltd.", "Samsung Electronics Co., Ltd."),
    ("samsung electronics co., ltd", "Samsung Electronics Co., Ltd."),
    ("samsung electronics co ltd", "Samsung Electronics Co., Ltd."),
    ("samsung electronics", "Samsung Electronics Co., Ltd."),
    ("samsung", "Samsung Electronics Co., Ltd."),
    ("l'oréal s.a.", "L'Oréal S.A."),
    ("l'oréal sa", "L'Oréal S.A."),
    ("l'oréal", "L'Oréal S.A."),
    ("loreal", "L'Oréal S.A."),
    ("nestlé s.a.", "Nestlé S.A."),
    ("nestle sa", "Nestlé S.A."),
    ("nestle", "Nestlé S.A."),
    ("nestlé", "Nestlé S.A."),
    ("oatly ab", "Oatly AB"),
    ("oatly", "Oatly AB"),
    ("chobani, llc", "Chobani, LLC"),
    ("chobani llc", "Chobani, LLC"),
    ("chobani", "Chobani, LLC"),
    ("dr. bronner's magic soaps", "Dr. Bronner's Magic Soaps"),
    ("dr bronner's magic soaps", "Dr. Bronner's Magic Soaps"),
    ("dr. bronner's", "Dr. Bronner's Magic Soaps"),
    ("dr bronner's", "Dr. Bronner's Magic Soaps"),
];

/// Sub-brand -> parent canonical name.
pub(crate) const SUB_BRAND_PARENTS: &[(&str, &str)] = &[
    // Unilever
    ("ben & jerry's", "Unilever"),
    ("ben and jerry's", "Unilever"),
    ("seventh generation", "Unilever"),
    ("dove", "Unilever"),
    ("axe", "Unilever"),
    ("hellmann's", "Unilever"),
    ("lipton", "Unilever"),
    ("knorr", "Unilever"),
    // Procter & Gamble
    ("tide", "The Procter & Gamble Company"),
    ("pampers", "The Procter & Gamble Company"),
    ("gillette", "The Procter & Gamble Company"),
    ("head & shoulders", "The Procter & Gamble Company"),
    ("olay", "The Procter & Gamble Company"),
    ("crest", "The Procter & Gamble Company"),
    ("bounty", "The Procter & Gamble Company"),
    ("charmin", "The Procter & Gamble Company"),
    // Clorox
    ("burt's bees", "The Clorox Company"),
    ("burt's bees products", "The Clorox Company"),
    ("glad", "The Clorox Company"),
    ("kingsford", "The Clorox Company"),
    ("hidden valley", "The Clorox Company"),
    // SC Johnson
    ("method", "SC Johnson"),
    ("method products", "SC Johnson"),
    ("pledge", "SC Johnson"),
    ("windex", "SC Johnson"),
    ("scrubbing bubbles", "SC Johnson"),
    // Aldi
    ("trader joe's", "Aldi Nord"),
    ("trader joes", "Aldi Nord"),
    // L'Oréal
    ("lancôme", "L'Oréal S.A."),
    ("maybelline", "L'Oréal S.A."),
    ("garnier", "L'Oréal S.A."),
    ("kiehl's", "L'Oréal S.A."),
    ("urban decay", "L'Oréal S.A."),
    // Nestlé
    ("nescafé", "Nestlé S.A."),
    ("nescafe", "Nestlé S.A."),
    ("kit kat", "Nestlé S.A."),
    ("kitkat", "Nestlé S.A."),
    ("maggi", "Nestlé S.A."),
    ("gerber", "Nestlé S.A."),
];
