//! Built-in normalization tables.
//!
//! Plain data only. Matching is case-insensitive and every multi-word phrase
//! tolerates runs of whitespace, so entries are written lowercase with single
//! spaces. Order matters only where noted.

use crate::models::TimeSlot;

// ═══════════════════════════════════════════════════════════
// Units
// ═══════════════════════════════════════════════════════════

/// Standard unit → written variants.
pub const UNIT_VARIANTS: &[(&str, &[&str])] = &[
    ("mcg", &["mcg", "mcgs", "microgram", "micrograms", "µg", "\u{3bc}g", "ug"]),
    ("mg", &["mg", "mgs", "milligram", "milligrams"]),
    ("g", &["g", "gm", "gms", "gram", "grams"]),
    ("mEq", &["meq"]),
    ("unit", &["unit", "units", "iu"]),
    ("mL", &["ml", "mls", "milliliter", "milliliters", "millilitre", "millilitres", "cc"]),
    ("tablet", &["tablet", "tablets", "tab", "tabs", "caplet", "caplets"]),
    ("capsule", &["capsule", "capsules", "cap", "caps"]),
    ("patch", &["patch", "patches"]),
    ("puff", &["puff", "puffs", "inhalation", "inhalations", "actuation", "actuations"]),
    ("spray", &["spray", "sprays"]),
    ("drop", &["drop", "drops", "gtt", "gtts"]),
    ("lozenge", &["lozenge", "lozenges", "troche", "troches"]),
    ("suppository", &["suppository", "suppositories"]),
];

/// Ranking used when several dose candidates appear in one order.
/// Units absent from this list rank after all of them.
pub const UNIT_PRECEDENCE: &[&str] = &[
    "mcg", "mg", "g", "mEq", "unit", "mL", "tablet", "capsule", "patch", "puff", "spray", "drop",
];

/// Units a quantity can be counted in.
pub const COUNTABLE_UNITS: &[&str] = &[
    "tablet",
    "capsule",
    "patch",
    "puff",
    "spray",
    "drop",
    "lozenge",
    "suppository",
];

/// Dosage form implied by the unit of a quantity word.
pub const QTY_UNIT_FORMS: &[(&str, &str)] = &[
    ("tablet", "tablet"),
    ("capsule", "capsule"),
    ("patch", "patch"),
    ("puff", "inhaler"),
    ("spray", "spray"),
    ("drop", "drops"),
    ("lozenge", "lozenge"),
    ("suppository", "suppository"),
];

pub const NUMBER_WORDS: &[(&str, f64)] = &[
    ("zero", 0.0),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("half", 0.5),
    ("a half", 0.5),
    ("one half", 0.5),
    ("one-half", 0.5),
];

// ═══════════════════════════════════════════════════════════
// Shorthand
// ═══════════════════════════════════════════════════════════

/// Prescriber shorthand expanded before any extraction.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("qhs", "at bedtime"),
    ("q.h.s.", "at bedtime"),
    ("qam", "every morning"),
    ("q am", "every morning"),
    ("q.a.m.", "every morning"),
    ("qpm", "every evening"),
    ("q pm", "every evening"),
    ("q.p.m.", "every evening"),
    ("qd", "daily"),
    ("q.d.", "daily"),
    ("qday", "daily"),
    ("qod", "every other day"),
    ("q.o.d.", "every other day"),
    ("b.i.d.", "bid"),
    ("t.i.d.", "tid"),
    ("q.i.d.", "qid"),
    ("tidac", "tid before meals"),
    ("tid ac", "tid before meals"),
    ("stat", "immediately"),
    ("now", "immediately"),
    ("w/", "with "),
];

// ═══════════════════════════════════════════════════════════
// Frequency and time of day
// ═══════════════════════════════════════════════════════════

/// Long-form frequency phrases → canonical code.
pub const FREQUENCY_PHRASES: &[(&str, &str)] = &[
    ("immediately", "immediately"),
    ("once now", "immediately"),
    ("daily", "daily"),
    ("once daily", "daily"),
    ("once a day", "daily"),
    ("once per day", "daily"),
    ("one time daily", "daily"),
    ("one time a day", "daily"),
    ("one time per day", "daily"),
    ("1 time daily", "daily"),
    ("1 time a day", "daily"),
    ("1x daily", "daily"),
    ("1x a day", "daily"),
    ("1x/day", "daily"),
    ("every day", "daily"),
    ("each day", "daily"),
    ("bid", "bid"),
    ("twice daily", "bid"),
    ("twice a day", "bid"),
    ("twice per day", "bid"),
    ("two times daily", "bid"),
    ("two times a day", "bid"),
    ("two times per day", "bid"),
    ("2 times daily", "bid"),
    ("2 times a day", "bid"),
    ("2 times per day", "bid"),
    ("2x daily", "bid"),
    ("2x a day", "bid"),
    ("2x/day", "bid"),
    ("tid", "tid"),
    ("three times daily", "tid"),
    ("three times a day", "tid"),
    ("three times per day", "tid"),
    ("thrice daily", "tid"),
    ("3 times daily", "tid"),
    ("3 times a day", "tid"),
    ("3 times per day", "tid"),
    ("3x daily", "tid"),
    ("3x a day", "tid"),
    ("3x/day", "tid"),
    ("with meals", "tid"),
    ("with each meal", "tid"),
    ("qid", "qid"),
    ("four times daily", "qid"),
    ("four times a day", "qid"),
    ("four times per day", "qid"),
    ("4 times daily", "qid"),
    ("4 times a day", "qid"),
    ("4 times per day", "qid"),
    ("4x daily", "qid"),
    ("4x a day", "qid"),
    ("4x/day", "qid"),
    ("every other day", "qod"),
    ("alternate days", "qod"),
    ("on alternate days", "qod"),
    ("weekly", "weekly"),
    ("once weekly", "weekly"),
    ("once a week", "weekly"),
    ("once per week", "weekly"),
    ("every week", "weekly"),
    ("monthly", "monthly"),
    ("once monthly", "monthly"),
    ("once a month", "monthly"),
    ("every month", "monthly"),
];

/// Time-of-day wording → slot. Evenings and bedtime are distinct slots.
pub const TIME_OF_DAY: &[(TimeSlot, &[&str])] = &[
    (
        TimeSlot::Morning,
        &[
            "in the morning",
            "every morning",
            "each morning",
            "in the am",
            "in am",
            "mornings",
            "morning",
            "am",
            "a.m.",
            "qam",
            "upon waking",
            "on waking",
        ],
    ),
    (TimeSlot::Noon, &["at noon", "noon", "midday", "at lunchtime", "lunchtime"]),
    (
        TimeSlot::Afternoon,
        &["in the afternoon", "every afternoon", "afternoon", "afternoons"],
    ),
    (
        TimeSlot::Evening,
        &[
            "in the evening",
            "in the evenings",
            "in evening",
            "every evening",
            "each evening",
            "evenings",
            "evening",
            "in the pm",
            "in pm",
            "pm",
            "p.m.",
            "qpm",
        ],
    ),
    (
        TimeSlot::Bedtime,
        &[
            "at bedtime",
            "before bedtime",
            "before bed",
            "bedtime",
            "at night",
            "every night",
            "each night",
            "nightly",
            "nights",
            "hs",
            "h.s.",
            "qhs",
        ],
    ),
];

// ═══════════════════════════════════════════════════════════
// Drugs
// ═══════════════════════════════════════════════════════════

/// Brand name → generic. Combination generics are joined with `/`.
pub const BRANDS: &[(&str, &str)] = &[
    ("lasix", "furosemide"),
    ("coumadin", "warfarin"),
    ("jantoven", "warfarin"),
    ("proair", "albuterol"),
    ("ventolin", "albuterol"),
    ("proventil", "albuterol"),
    ("spiriva", "tiotropium"),
    ("novolog", "insulin aspart"),
    ("humalog", "insulin lispro"),
    ("lantus", "insulin glargine"),
    ("basaglar", "insulin glargine"),
    ("levemir", "insulin detemir"),
    ("glucophage", "metformin"),
    ("lipitor", "atorvastatin"),
    ("zocor", "simvastatin"),
    ("crestor", "rosuvastatin"),
    ("pravachol", "pravastatin"),
    ("zestril", "lisinopril"),
    ("prinivil", "lisinopril"),
    ("zestoretic", "lisinopril/hydrochlorothiazide"),
    ("norvasc", "amlodipine"),
    ("lopressor", "metoprolol"),
    ("toprol", "metoprolol"),
    ("tenormin", "atenolol"),
    ("coreg", "carvedilol"),
    ("catapres", "clonidine"),
    ("neurontin", "gabapentin"),
    ("lyrica", "pregabalin"),
    ("zofran", "ondansetron"),
    ("flonase", "fluticasone"),
    ("flovent", "fluticasone"),
    ("advair", "fluticasone/salmeterol"),
    ("symbicort", "budesonide/formoterol"),
    ("singulair", "montelukast"),
    ("synthroid", "levothyroxine"),
    ("levoxyl", "levothyroxine"),
    ("protonix", "pantoprazole"),
    ("prilosec", "omeprazole"),
    ("nexium", "esomeprazole"),
    ("pepcid", "famotidine"),
    ("tylenol", "acetaminophen"),
    ("motrin", "ibuprofen"),
    ("advil", "ibuprofen"),
    ("aleve", "naproxen"),
    ("voltaren", "diclofenac"),
    ("cataflam", "diclofenac"),
    ("plavix", "clopidogrel"),
    ("eliquis", "apixaban"),
    ("xarelto", "rivaroxaban"),
    ("k-dur", "potassium chloride"),
    ("klor-con", "potassium chloride"),
    ("micro-k", "potassium chloride"),
    ("microzide", "hydrochlorothiazide"),
    ("aldactone", "spironolactone"),
    ("deltasone", "prednisone"),
    ("medrol", "methylprednisolone"),
    ("zoloft", "sertraline"),
    ("lexapro", "escitalopram"),
    ("prozac", "fluoxetine"),
    ("celexa", "citalopram"),
    ("wellbutrin", "bupropion"),
    ("desyrel", "trazodone"),
    ("ambien", "zolpidem"),
    ("xanax", "alprazolam"),
    ("ativan", "lorazepam"),
    ("klonopin", "clonazepam"),
    ("seroquel", "quetiapine"),
    ("flomax", "tamsulosin"),
    ("proscar", "finasteride"),
    ("januvia", "sitagliptin"),
    ("jardiance", "empagliflozin"),
    ("farxiga", "dapagliflozin"),
    ("ozempic", "semaglutide"),
    ("trulicity", "dulaglutide"),
    ("augmentin", "amoxicillin/clavulanate"),
    ("amoxil", "amoxicillin"),
    ("keflex", "cephalexin"),
    ("cipro", "ciprofloxacin"),
    ("bactrim", "sulfamethoxazole/trimethoprim"),
    ("zithromax", "azithromycin"),
    ("colace", "docusate"),
    ("senokot", "senna"),
    ("miralax", "polyethylene glycol"),
    ("imdur", "isosorbide mononitrate"),
    ("nitrostat", "nitroglycerin"),
    ("lanoxin", "digoxin"),
    ("cozaar", "losartan"),
    ("hyzaar", "losartan/hydrochlorothiazide"),
    ("diovan", "valsartan"),
    ("vasotec", "enalapril"),
    ("altace", "ramipril"),
    ("glucotrol", "glipizide"),
    ("amaryl", "glimepiride"),
    ("ultram", "tramadol"),
    ("percocet", "oxycodone/acetaminophen"),
    ("norco", "hydrocodone/acetaminophen"),
];

/// Generic names recognised on their own, beyond those named by `BRANDS`.
pub const GENERICS: &[&str] = &[
    "insulin",
    "aspirin",
    "heparin",
    "enoxaparin",
    "hydralazine",
    "allopurinol",
    "magnesium oxide",
    "calcium carbonate",
    "cholecalciferol",
    "folic acid",
    "thiamine",
    "cyanocobalamin",
    "ferrous sulfate",
    "multivitamin",
    "nicotine",
    "melatonin",
    "loratadine",
    "cetirizine",
    "diphenhydramine",
    "meclizine",
    "oxybutynin",
    "baclofen",
    "cyclobenzaprine",
    "methocarbamol",
    "morphine",
    "hydromorphone",
    "dexamethasone",
    "ipratropium",
    "hydroxyzine",
    "buspirone",
    "mirtazapine",
    "venlafaxine",
    "duloxetine",
    "amitriptyline",
    "topiramate",
    "levetiracetam",
    "lamotrigine",
    "donepezil",
    "memantine",
    "haloperidol",
    "olanzapine",
    "risperidone",
    "aripiprazole",
    "bumetanide",
    "torsemide",
    "chlorthalidone",
    "diltiazem",
    "verapamil",
    "nifedipine",
    "propranolol",
    "labetalol",
    "isosorbide",
];

/// Ingredient abbreviations → generic.
pub const INGREDIENT_ABBREVIATIONS: &[(&str, &str)] = &[
    ("hctz", "hydrochlorothiazide"),
    ("apap", "acetaminophen"),
    ("asa", "aspirin"),
    ("kcl", "potassium chloride"),
    ("ntg", "nitroglycerin"),
    ("mvi", "multivitamin"),
];

/// Salt and hydrate words that do not change the active moiety.
pub const SALTS: &[&str] = &[
    "hydrochloride",
    "hcl",
    "hydrobromide",
    "hbr",
    "sodium",
    "potassium",
    "calcium",
    "magnesium",
    "besylate",
    "maleate",
    "mesylate",
    "succinate",
    "tartrate",
    "bitartrate",
    "fumarate",
    "citrate",
    "acetate",
    "phosphate",
    "sulfate",
    "bromide",
    "propionate",
    "dipropionate",
    "furoate",
    "xinafoate",
    "hyclate",
    "valerate",
    "gluconate",
    "monohydrate",
    "dihydrate",
    "trihydrate",
];

/// Drugs whose salt selects a different release profile or product,
/// so a salt swap is a formulation change for them.
pub const FUNCTIONAL_SALT_DRUGS: &[&str] = &["diclofenac", "metoprolol", "bupropion"];

// ═══════════════════════════════════════════════════════════
// Order vocabulary
// ═══════════════════════════════════════════════════════════

pub const FORMULATIONS: &[(&str, &[&str])] = &[
    (
        "extended release",
        &[
            "extended release",
            "extended-release",
            "sustained release",
            "sustained-release",
            "controlled release",
            "controlled-release",
            "long acting",
            "long-acting",
            "xr",
            "er",
            "sr",
            "xl",
            "la",
            "cr",
        ],
    ),
    (
        "delayed release",
        &[
            "delayed release",
            "delayed-release",
            "enteric coated",
            "enteric-coated",
            "dr",
            "ec",
        ],
    ),
    (
        "immediate release",
        &["immediate release", "immediate-release", "ir"],
    ),
    ("orally disintegrating", &["orally disintegrating", "odt"]),
];

pub const ROUTES: &[(&str, &[&str])] = &[
    ("oral", &["by mouth", "per mouth", "orally", "oral", "per os", "po", "p.o."]),
    ("sublingual", &["sublingually", "sublingual", "under the tongue", "sl"]),
    (
        "subcutaneous",
        &[
            "subcutaneously",
            "subcutaneous",
            "subcut",
            "subq",
            "sub-q",
            "sub q",
            "sq",
            "sc",
        ],
    ),
    ("intravenous", &["intravenously", "intravenous", "iv push", "ivpb", "iv"]),
    ("intramuscular", &["intramuscularly", "intramuscular", "im"]),
    (
        "topical",
        &[
            "topically",
            "topical",
            "to affected areas",
            "to affected area",
            "to the skin",
            "to skin",
        ],
    ),
    ("transdermal", &["transdermally", "transdermal"]),
    (
        "inhalation",
        &[
            "by inhalation",
            "via inhalation",
            "via inhaler",
            "via nebulizer",
            "nebulized",
            "inhaled",
            "inhale",
            "inhalation",
        ],
    ),
    (
        "nasal",
        &[
            "intranasally",
            "intranasal",
            "nasally",
            "nasal",
            "in each nostril",
            "each nostril",
            "per nostril",
            "in nostril",
            "in each nare",
            "each nare",
        ],
    ),
    (
        "ophthalmic",
        &[
            "ophthalmic",
            "in each eye",
            "in both eyes",
            "each eye",
            "in affected eye",
            "in the eye",
            "in eye",
            "ou",
        ],
    ),
    (
        "otic",
        &[
            "otic",
            "in each ear",
            "in both ears",
            "in affected ear",
            "in the ear",
            "in ear",
        ],
    ),
    ("rectal", &["rectally", "rectal", "per rectum", "pr"]),
    ("vaginal", &["vaginally", "vaginal", "per vagina", "pv"]),
];

/// Dosage forms in precedence order: the first form named wins over later
/// ones, so dosage nouns outrank device words.
pub const FORMS: &[(&str, &[&str])] = &[
    ("tablet", &["tablets", "tablet", "tabs", "tab", "caplets", "caplet"]),
    ("capsule", &["capsules", "capsule", "caps", "cap"]),
    (
        "patch",
        &["transdermal patch", "transdermal system", "patches", "patch"],
    ),
    (
        "solution",
        &["oral solution", "solution", "liquid", "syrup", "elixir"],
    ),
    ("suspension", &["suspension"]),
    ("cream", &["cream"]),
    ("ointment", &["ointment"]),
    ("gel", &["gel"]),
    ("lotion", &["lotion"]),
    ("drops", &["eye drops", "ear drops", "drops", "drop", "gtts", "gtt"]),
    ("spray", &["nasal spray", "sprays", "spray"]),
    ("pen", &["flexpen", "kwikpen", "solostar", "flextouch", "pen"]),
    ("injection", &["injection", "prefilled syringe", "syringe", "vial"]),
    ("suppository", &["suppositories", "suppository"]),
    ("lozenge", &["lozenges", "lozenge", "troches", "troche"]),
    (
        "inhaler",
        &[
            "inhaler",
            "hfa",
            "mdi",
            "respiclick",
            "respimat",
            "handihaler",
            "diskus",
            "ellipta",
            "inhalations",
            "inhalation",
            "actuations",
            "actuation",
            "puffs",
            "puff",
        ],
    ),
];

/// Administration instructions → canonical instruction.
pub const ADMINISTRATION: &[(&str, &[&str])] = &[
    (
        "with food",
        &[
            "with food",
            "with meals",
            "with a meal",
            "with meal",
            "with each meal",
            "with breakfast",
            "with lunch",
            "with dinner",
            "with supper",
            "with orange juice",
            "with juice",
            "with milk",
            "after meals",
            "after a meal",
            "after eating",
            "after food",
            "pc",
            "p.c.",
        ],
    ),
    (
        "between meals",
        &[
            "on an empty stomach",
            "on empty stomach",
            "empty stomach",
            "between meals",
            "without food",
        ],
    ),
    (
        "before meals",
        &[
            "before meals",
            "before each meal",
            "before breakfast",
            "before eating",
            "before food",
            "ac",
            "a.c.",
        ],
    ),
    (
        "with water",
        &[
            "with a full glass of water",
            "with plenty of water",
            "with water",
        ],
    ),
    (
        "swallow whole",
        &[
            "swallow whole",
            "do not crush or chew",
            "do not crush",
            "do not chew",
        ],
    ),
    ("shake well", &["shake well"]),
    ("rinse mouth", &["rinse mouth after use", "rinse mouth"]),
];

/// Indication wording → canonical indication.
pub const INDICATIONS: &[(&str, &[&str])] = &[
    (
        "breathing difficulty",
        &[
            "wheezing",
            "wheeze",
            "wheezes",
            "sob",
            "shortness of breath",
            "short of breath",
            "dyspnea",
            "bronchospasm",
            "difficulty breathing",
            "breathing difficulty",
        ],
    ),
    (
        "neuropathy",
        &[
            "nerve pain",
            "neuropathic pain",
            "neuropathy",
            "peripheral neuropathy",
        ],
    ),
    (
        "atrial fibrillation",
        &["af", "afib", "a fib", "a-fib", "atrial fibrillation"],
    ),
    (
        "hypertension",
        &[
            "bp",
            "blood pressure",
            "high blood pressure",
            "elevated bp",
            "htn",
            "hypertension",
        ],
    ),
    (
        "gerd",
        &[
            "gerd",
            "reflux",
            "acid reflux",
            "heartburn",
            "gastroesophageal reflux",
        ],
    ),
    (
        "diabetes",
        &[
            "dm",
            "t2dm",
            "diabetes",
            "type 2 diabetes",
            "diabetes mellitus",
            "blood sugar",
            "high blood sugar",
        ],
    ),
    ("insomnia", &["insomnia", "sleep", "trouble sleeping"]),
    (
        "nausea",
        &["nausea", "n/v", "nausea/vomiting", "nausea and vomiting"],
    ),
    ("anxiety", &["anxiety", "anxious"]),
    ("constipation", &["constipation"]),
    (
        "heart failure",
        &["chf", "hf", "heart failure", "congestive heart failure"],
    ),
    (
        "hyperlipidemia",
        &["hld", "hyperlipidemia", "high cholesterol", "cholesterol"],
    ),
    ("depression", &["depression", "mdd"]),
    (
        "allergies",
        &["allergies", "seasonal allergies", "allergic rhinitis"],
    ),
];
