pub mod bedrooms;
pub mod category;
pub mod keywords;
pub mod rating;
pub mod room_type;

/// One first-match category rule: the label wins when any keyword hits.
pub struct CategoryRule {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

/// Immutable keyword configuration shared by the extractors. Passed in
/// rather than read from globals so extractors stay independently testable.
pub struct Vocabulary {
    pub amenities: &'static [&'static str],
    pub suite_features: &'static [&'static str],
    pub pet_indicators: &'static [&'static str],
    pub faq_tags: &'static [&'static str],
    pub categories: &'static [CategoryRule],
    pub room_types: &'static [(&'static str, &'static str)],
    pub default_category: &'static str,
    pub default_room_type: &'static str,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            amenities: AMENITY_KEYWORDS,
            suite_features: SUITE_FEATURE_KEYWORDS,
            pet_indicators: PET_INDICATORS,
            faq_tags: FAQ_TAG_KEYWORDS,
            categories: CATEGORY_RULES,
            room_types: ROOM_TYPE_RULES,
            default_category: "General",
            default_room_type: "Suite",
        }
    }
}

const AMENITY_KEYWORDS: &[&str] = &[
    "Gym",
    "Laundry",
    "Parking",
    "Pool",
    "WiFi",
    "Furnished",
    "Pet Friendly",
    "Free WiFi",
    "Fully Furnished",
    "In-suite Laundry",
    "Fitness Center",
    "Exercise Room",
    "Workout Room",
    "Business Center",
    "Concierge",
    "Doorman",
    "Security",
    "Elevator",
    "Balcony",
    "Terrace",
    "Garden",
    "BBQ",
    "Outdoor Space",
    "Storage",
    "Bike Storage",
];

const SUITE_FEATURE_KEYWORDS: &[&str] = &[
    "Fully Furnished",
    "Furnished",
    "Unfurnished",
    "Partially Furnished",
    "Kitchen",
    "Full Kitchen",
    "Kitchenette",
    "Kitchen Appliances",
    "Dishwasher",
    "Microwave",
    "Stove",
    "Oven",
    "Refrigerator",
    "In-suite Laundry",
    "Washer",
    "Dryer",
    "Laundry Hookups",
    "Balcony",
    "Terrace",
    "Patio",
    "Private Balcony",
    "Walk-in Closet",
    "Storage",
    "Built-in Storage",
    "Hardwood Floors",
    "Carpeted",
    "Tile Floors",
    "Air Conditioning",
    "Central Air",
    "Heating",
    "Walk-in Shower",
    "Tub",
    "Ensuite Bathroom",
    "Queen Bed",
    "King Bed",
    "Double Bed",
    "Single Bed",
    "Sofa Bed",
    "Pull-out Couch",
    "Dining Table",
    "Work Desk",
    "Office Space",
    "Study Area",
    "City View",
    "Mountain View",
    "Water View",
    "Garden View",
    "Corner Unit",
    "End Unit",
    "Top Floor",
    "Penthouse",
    "Newly Renovated",
    "Updated",
    "Modern",
    "Contemporary",
    "Luxury",
    "Premium",
    "High-end",
    "Designer",
];

const PET_INDICATORS: &[&str] = &[
    "pet friendly",
    "pets allowed",
    "pet-friendly",
    "pets welcome",
    "pet policy",
    "dogs allowed",
    "cats allowed",
];

const FAQ_TAG_KEYWORDS: &[&str] = &[
    "booking",
    "reservation",
    "check-in",
    "check-out",
    "payment",
    "cancellation",
    "pet",
    "pet-friendly",
    "amenities",
    "furnished",
    "utilities",
    "internet",
    "parking",
    "laundry",
    "cleaning",
    "maintenance",
    "security",
    "deposit",
    "rent",
    "lease",
    "contract",
    "corporate",
    "short-term",
    "long-term",
    "furniture",
    "kitchen",
    "bedroom",
    "bathroom",
    "gym",
    "pool",
];

// Rule order is load-bearing: a text matching several rules takes the first
// one, so booking beats payment and payment beats pets.
const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        label: "Booking & Reservations",
        keywords: &["book", "reservation", "check-in", "check-out", "cancel"],
    },
    CategoryRule {
        label: "Payment & Pricing",
        keywords: &["payment", "deposit", "rent", "cost", "price", "rate", "fee"],
    },
    CategoryRule {
        label: "Pet Policies",
        keywords: &["pet", "animal", "dog", "cat"],
    },
    CategoryRule {
        label: "Corporate Services",
        keywords: &["alliance", "corporate", "business", "company", "partner"],
    },
    CategoryRule {
        label: "Amenities & Services",
        keywords: &[
            "amenity",
            "furniture",
            "kitchen",
            "laundry",
            "gym",
            "pool",
            "housekeeping",
        ],
    },
    CategoryRule {
        label: "Rules & Regulations",
        keywords: &["smoking", "policy", "rule", "regulation"],
    },
    CategoryRule {
        label: "Technology & Services",
        keywords: &["wifi", "internet", "phone", "tv", "cable"],
    },
];

const ROOM_TYPE_RULES: &[(&str, &str)] = &[
    ("kitchen", "Kitchen"),
    ("living room", "Living Room"),
    ("dining", "Dining Room"),
];
