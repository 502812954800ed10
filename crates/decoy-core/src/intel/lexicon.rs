//! Keyword tables used by local classification.
//!
//! Each rule maps an upper-snake label to the lower-case terms that trigger
//! it. Terms are matched on word boundaries.

pub type Rule = (&'static str, &'static [&'static str]);

pub const SCAM_TYPE_RULES: &[Rule] = &[
    (
        "OTP_THEFT",
        &[
            "otp",
            "one time password",
            "one-time password",
            "verification code",
            "security code",
            "6 digit code",
            "6-digit code",
        ],
    ),
    (
        "FINANCIAL_FRAUD",
        &[
            "bank account",
            "account number",
            "ifsc",
            "transfer",
            "refund",
            "send money",
            "deposit",
            "processing fee",
            "wire",
            "investment",
            "double your money",
            "loan",
            "payment",
            "credit card",
            "debit card",
        ],
    ),
    (
        "CREDENTIAL_THEFT",
        &[
            "password",
            "passcode",
            "pin",
            "mpin",
            "login",
            "username",
            "cvv",
            "net banking",
            "credentials",
        ],
    ),
    (
        "IDENTITY_THEFT",
        &[
            "aadhaar",
            "aadhar",
            "pan card",
            "pan number",
            "ssn",
            "social security",
            "date of birth",
            "passport",
            "kyc",
            "mother's maiden name",
        ],
    ),
    (
        "LOTTERY_SCAM",
        &[
            "lottery",
            "you have won",
            "you won",
            "prize",
            "jackpot",
            "lucky draw",
            "winner",
        ],
    ),
    (
        "TECH_SUPPORT",
        &[
            "anydesk",
            "teamviewer",
            "quicksupport",
            "remote access",
            "virus",
            "tech support",
            "technical support",
        ],
    ),
    (
        "JOB_SCAM",
        &[
            "work from home",
            "part time job",
            "part-time job",
            "job offer",
            "registration fee",
            "daily income",
        ],
    ),
    (
        "PHISHING",
        &[
            "click the link",
            "click this link",
            "click here",
            "verify your account",
            "update your kyc",
            "login here",
        ],
    ),
];

pub const PSYCHOLOGICAL_RULES: &[Rule] = &[
    (
        "URGENCY",
        &[
            "urgent",
            "urgently",
            "immediately",
            "now",
            "asap",
            "hurry",
            "quickly",
            "within 24 hours",
            "within 2 hours",
            "today itself",
            "expire",
            "expires",
            "expiring",
        ],
    ),
    (
        "FEAR",
        &[
            "blocked",
            "suspended",
            "frozen",
            "arrest",
            "legal action",
            "police case",
            "penalty",
            "deactivated",
            "terminated",
            "locked",
            "warrant",
            "court",
        ],
    ),
    (
        "AUTHORITY",
        &[
            "bank officer",
            "bank official",
            "manager",
            "rbi",
            "reserve bank",
            "police",
            "government",
            "income tax",
            "customs",
            "officer",
            "department",
            "cyber cell",
        ],
    ),
    (
        "GREED",
        &[
            "won", "prize", "reward", "cashback", "bonus", "lottery", "jackpot", "gift", "double",
        ],
    ),
    (
        "SCARCITY",
        &[
            "limited time",
            "only today",
            "last chance",
            "offer ends",
            "few slots",
            "limited offer",
        ],
    ),
    (
        "TRUST_BUILDING",
        &[
            "trust me",
            "don't worry",
            "dont worry",
            "100% safe",
            "guaranteed",
            "for your safety",
            "for your security",
        ],
    ),
];

pub const REQUESTED_DATA_RULES: &[Rule] = &[
    (
        "OTP",
        &["otp", "one time password", "verification code", "security code"],
    ),
    ("PASSWORD", &["password", "passcode"]),
    ("PIN", &["pin", "mpin", "atm pin", "upi pin"]),
    ("CVV", &["cvv", "cvc"]),
    (
        "CARD_NUMBER",
        &["card number", "card details", "expiry date", "debit card", "credit card"],
    ),
    (
        "BANK_ACCOUNT",
        &["account number", "bank account", "ifsc", "bank details"],
    ),
    ("UPI_ID", &["upi id", "upi", "vpa"]),
    (
        "PERSONAL_INFO",
        &[
            "aadhaar",
            "aadhar",
            "pan card",
            "date of birth",
            "dob",
            "full name",
            "address",
            "mother's maiden name",
            "ssn",
        ],
    ),
];

pub const ATTACK_METHOD_RULES: &[Rule] = &[
    (
        "PHISHING_LINK",
        &["click", "link", "website", "visit"],
    ),
    (
        "PAYMENT_REQUEST",
        &[
            "send money",
            "transfer",
            "pay",
            "payment",
            "deposit",
            "processing fee",
            "registration fee",
        ],
    ),
    (
        "CALL_REQUEST",
        &[
            "call me",
            "call this number",
            "call us",
            "contact number",
            "helpline",
        ],
    ),
    (
        "REMOTE_ACCESS",
        &[
            "anydesk",
            "teamviewer",
            "quicksupport",
            "remote access",
            "screen share",
            "install app",
            "download app",
        ],
    ),
    (
        "PLATFORM_SHIFT",
        &["whatsapp", "telegram", "text me on", "move to"],
    ),
    (
        "CREDENTIAL_REQUEST",
        &[
            "send your otp",
            "share your otp",
            "send otp",
            "share otp",
            "tell me the otp",
            "share your password",
            "send your pin",
            "share the code",
            "send the code",
        ],
    ),
];

/// Display name and trigger terms for commonly impersonated organizations.
pub const IMPERSONATED_ENTITIES: &[Rule] = &[
    ("SBI", &["sbi", "state bank"]),
    ("HDFC Bank", &["hdfc"]),
    ("ICICI Bank", &["icici"]),
    ("Axis Bank", &["axis bank"]),
    ("Paytm", &["paytm"]),
    ("PhonePe", &["phonepe"]),
    ("Google Pay", &["google pay", "gpay"]),
    ("Amazon", &["amazon"]),
    ("Flipkart", &["flipkart"]),
    ("RBI", &["rbi", "reserve bank"]),
    ("Police", &["police", "cyber cell", "cyber crime"]),
    ("Income Tax Department", &["income tax"]),
    ("Customs", &["customs"]),
    ("Microsoft", &["microsoft"]),
    ("Apple", &["apple support", "icloud"]),
    ("FedEx", &["fedex"]),
    ("TRAI", &["trai"]),
    ("Electricity Board", &["electricity bill", "electricity board"]),
];

pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "urgent",
    "verify",
    "blocked",
    "suspended",
    "otp",
    "prize",
    "lottery",
    "refund",
    "kyc",
    "cvv",
    "pin",
    "password",
    "arrest",
    "penalty",
    "expire",
    "immediately",
    "click",
    "winner",
    "cashback",
    "anydesk",
    "teamviewer",
    "processing fee",
    "legal action",
    "account number",
];

/// Phrases characteristic of scripted scam openers, matched as substrings.
pub const KEY_PHRASES: &[&str] = &[
    "account will be blocked",
    "account has been blocked",
    "account is blocked",
    "account suspended",
    "verify your account",
    "update your kyc",
    "kyc update",
    "share the otp",
    "send the otp",
    "you have won",
    "claim your prize",
    "legal action will be taken",
    "pay the processing fee",
    "click the link",
    "do not share with anyone",
    "your card is blocked",
    "refund has been initiated",
];

/// Impatience and suspicion markers in counterparty text.
pub const FRUSTRATION_MARKERS: &[&str] = &[
    "are you there",
    "hello?",
    "hurry up",
    "stop wasting",
    "wasting my time",
    "waste my time",
    "why are you",
    "answer me",
    "reply fast",
    "reply quickly",
    "respond now",
    "are you a bot",
    "are you kidding",
    "last warning",
    "i am waiting",
    "i'm waiting",
    "im waiting",
    "why so many questions",
    "are you police",
    "are you recording",
    "are you fooling",
    "do it now",
    "how many times",
];

/// Recognized UPI/wallet provider suffixes for `user@provider` handles.
pub const PAYMENT_PROVIDERS: &[&str] = &[
    "paytm",
    "ybl",
    "okaxis",
    "okhdfcbank",
    "okicici",
    "oksbi",
    "upi",
    "apl",
    "axl",
    "ibl",
    "sbi",
    "hdfcbank",
    "icici",
    "axisbank",
    "kotak",
    "freecharge",
    "airtel",
    "jio",
    "phonepe",
    "gpay",
    "amazonpay",
    "axisb",
    "yapl",
    "ptyes",
    "ptsbi",
    "pthdfc",
    "ikwik",
    "waaxis",
    "wahdfcbank",
];

/// Top-level domains accepted for scheme-less, `www`-less links.
pub const LINK_TLDS: &[&str] = &[
    "com", "net", "org", "in", "co", "info", "xyz", "top", "online", "site", "link", "io", "me",
    "biz", "club", "live", "app", "ly", "cc", "tk", "ml", "ga", "cf", "gq", "ru", "cn", "shop",
    "store", "click", "support",
];

/// Scam categories that raise report severity.
pub const HIGH_SEVERITY_SCAM_TYPES: &[&str] =
    &["FINANCIAL_FRAUD", "CREDENTIAL_THEFT", "IDENTITY_THEFT"];
