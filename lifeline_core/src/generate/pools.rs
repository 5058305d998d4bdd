//! Fixed content pools - the fallback behind the generation contract.

/// Career-oriented milestone content, used for odd milestone indices.
pub const CAREER_MILESTONES: [&str; 8] = [
    "Land your first real job",
    "Get promoted to team lead",
    "Switch careers into tech",
    "Start a side business that actually works",
    "Buy your first home",
    "Finish a graduate degree at night",
    "Get headhunted by a rival company",
    "Open your own practice",
];

/// Risk-oriented milestone content, used for even milestone indices.
pub const RISK_MILESTONES: [&str; 8] = [
    "Quit your job to travel the world",
    "Move to a new city on a whim",
    "Invest your savings in a friend's startup",
    "Take a year off to write a novel",
    "Learn to fly a plane",
    "Sell everything and sail across an ocean",
    "Enter an amateur boxing tournament",
    "Bet big on a career pivot nobody understands",
];

/// Generic outcome phrases for prediction content and re-rolls.
pub const OUTCOME_PHRASES: [&str; 8] = [
    "It goes better than anyone expected",
    "It falls apart within a year",
    "It works out, but not the way you planned",
    "You walk away early and never look back",
    "It becomes the thing you are known for",
    "You break even and call it a lesson",
    "A stranger's advice changes the outcome entirely",
    "It quietly becomes the best decision you ever made",
];

/// Neutral random-offer pool, drawn 80% of the time.
pub const GENERIC_OFFERS: [&str; 10] = [
    "A stranger offers you their spare concert ticket",
    "An old friend invites you on a last-minute road trip",
    "You are offered a short contract abroad",
    "A neighbor asks you to co-found a weekend club",
    "A landlord offers you a cheap lease in a strange part of town",
    "A recruiter pitches you a moonshot startup",
    "You find a flyer for a free improv class tonight",
    "A cousin asks you to help run their food stall for a month",
    "A professor invites you to join a research expedition",
    "Someone leaves a piano on the curb outside your door",
];

/// Curated sponsored offers: display text plus sponsor label.
pub const SPONSORED_OFFERS: [(&str, &str); 5] = [
    ("Try the new cold brew flight at SkyBrew", "SkyBrew"),
    ("Test-drive the Volta e-bike for a week", "Volta"),
    ("Claim a free month at IronWorks Gym", "IronWorks"),
    ("Beta-test the MindMaze puzzle app", "MindMaze"),
    ("Taste the seasonal menu at Copper Fork", "Copper Fork"),
];
