//! Sample catalogue seeding.
//!
//! [`seed_catalogue`] wipes experts, slots and bookings, then inserts the
//! sample experts, each with randomly generated slots for the coming days.

use crate::{PostgresExpertStore, store_error};
use chrono::{Duration, NaiveDate};
use expert_booking_core::error::StoreResult;
use expert_booking_core::types::{Category, Expert, ExpertId, Slot};
use rand::Rng;
use rand::seq::SliceRandom;

/// Time labels a seeded slot may take, in chronological order.
pub const TIME_LABELS: [&str; 14] = [
    "09:00 AM", "09:30 AM", "10:00 AM", "10:30 AM", "11:00 AM", "11:30 AM", "12:00 PM",
    "02:00 PM", "02:30 PM", "03:00 PM", "03:30 PM", "04:00 PM", "04:30 PM", "05:00 PM",
];

/// Fewest slots generated per day.
pub const MIN_SLOTS_PER_DAY: usize = 6;

/// Most slots generated per day.
pub const MAX_SLOTS_PER_DAY: usize = 10;

/// Probability that a generated slot starts out booked.
pub const PRE_BOOKED_RATIO: f64 = 0.15;

/// Static description of a sample expert.
#[derive(Debug, Clone, Copy)]
pub struct SeedExpert {
    /// Display name
    pub name: &'static str,
    /// Category
    pub category: Category,
    /// Years of experience
    pub experience: u32,
    /// Rating
    pub rating: f64,
    /// Biography
    pub bio: &'static str,
    /// Avatar emoji
    pub avatar: &'static str,
    /// Specialization tags
    pub specializations: &'static [&'static str],
}

impl SeedExpert {
    /// Materialise with a fresh id and the given slots.
    #[must_use]
    pub fn to_expert(&self, available_slots: Vec<Slot>) -> Expert {
        Expert {
            id: ExpertId::new(),
            name: self.name.to_string(),
            category: self.category,
            experience: self.experience,
            rating: self.rating,
            bio: self.bio.to_string(),
            avatar: self.avatar.to_string(),
            specializations: self.specializations.iter().map(|s| (*s).to_string()).collect(),
            available_slots,
        }
    }
}

/// The sample catalogue.
pub const SAMPLE_EXPERTS: &[SeedExpert] = &[
    SeedExpert {
        name: "Dr. Sarah Chen",
        category: Category::Technology,
        experience: 12,
        rating: 4.9,
        bio: "Senior AI researcher with expertise in machine learning and deep learning. Former Google Brain team member.",
        avatar: "👩‍💻",
        specializations: &["Machine Learning", "Deep Learning", "Python"],
    },
    SeedExpert {
        name: "James Rodriguez",
        category: Category::Business,
        experience: 15,
        rating: 4.8,
        bio: "Serial entrepreneur and business strategist. Has founded and scaled 3 startups to acquisition.",
        avatar: "👨‍💼",
        specializations: &["Startup Strategy", "Fundraising", "Growth"],
    },
    SeedExpert {
        name: "Dr. Emily Watson",
        category: Category::Health,
        experience: 10,
        rating: 4.7,
        bio: "Board-certified nutritionist and wellness coach specializing in holistic health approaches.",
        avatar: "👩‍⚕️",
        specializations: &["Nutrition", "Wellness", "Mental Health"],
    },
    SeedExpert {
        name: "Alex Kim",
        category: Category::Design,
        experience: 8,
        rating: 4.9,
        bio: "Award-winning UX designer. Previously led design at Spotify and Airbnb.",
        avatar: "🎨",
        specializations: &["UX/UI Design", "Design Systems", "Figma"],
    },
    SeedExpert {
        name: "Prof. Michael Brown",
        category: Category::Education,
        experience: 20,
        rating: 4.6,
        bio: "Education technology pioneer. Developed curricula adopted by 50+ universities worldwide.",
        avatar: "👨‍🏫",
        specializations: &["EdTech", "Curriculum Design", "Online Learning"],
    },
    SeedExpert {
        name: "Lisa Park",
        category: Category::Technology,
        experience: 9,
        rating: 4.8,
        bio: "Full-stack developer and cloud architect. AWS certified solutions architect.",
        avatar: "💻",
        specializations: &["Cloud Architecture", "AWS", "React"],
    },
    SeedExpert {
        name: "David Martinez",
        category: Category::Business,
        experience: 18,
        rating: 4.5,
        bio: "Investment banker turned venture capitalist. Managing partner at TechVentures Capital.",
        avatar: "📊",
        specializations: &["Venture Capital", "Financial Modeling", "M&A"],
    },
    SeedExpert {
        name: "Dr. Aisha Patel",
        category: Category::Health,
        experience: 14,
        rating: 4.9,
        bio: "Sports medicine specialist and performance coach for Olympic athletes.",
        avatar: "🏥",
        specializations: &["Sports Medicine", "Performance", "Rehabilitation"],
    },
    SeedExpert {
        name: "Tom Anderson",
        category: Category::Design,
        experience: 11,
        rating: 4.7,
        bio: "Brand identity expert and creative director. Has worked with Fortune 500 companies.",
        avatar: "✏️",
        specializations: &["Brand Design", "Visual Identity", "Typography"],
    },
    SeedExpert {
        name: "Prof. Rachel Green",
        category: Category::Education,
        experience: 16,
        rating: 4.8,
        bio: "Data science educator and author of bestselling data analytics textbooks.",
        avatar: "📚",
        specializations: &["Data Science", "Statistics", "R Programming"],
    },
    SeedExpert {
        name: "Chris Yang",
        category: Category::Technology,
        experience: 7,
        rating: 4.6,
        bio: "Cybersecurity expert and ethical hacker. Lead security engineer at a major fintech company.",
        avatar: "🔐",
        specializations: &["Cybersecurity", "Penetration Testing", "DevSecOps"],
    },
    SeedExpert {
        name: "Maria Gonzalez",
        category: Category::Business,
        experience: 13,
        rating: 4.7,
        bio: "Digital marketing strategist specializing in SaaS growth and content marketing.",
        avatar: "📈",
        specializations: &["Digital Marketing", "SEO", "Content Strategy"],
    },
    SeedExpert {
        name: "Dr. Raj Krishnan",
        category: Category::Technology,
        experience: 16,
        rating: 4.9,
        bio: "Distributed systems architect and former principal engineer at Amazon. Expert in building planet-scale infrastructure.",
        avatar: "🌐",
        specializations: &["Distributed Systems", "System Design", "Go"],
    },
    SeedExpert {
        name: "Sophie Laurent",
        category: Category::Design,
        experience: 10,
        rating: 4.8,
        bio: "Motion design specialist and creative technologist. Has crafted award-winning animations for Apple and Nike.",
        avatar: "🎬",
        specializations: &["Motion Design", "After Effects", "3D Animation"],
    },
    SeedExpert {
        name: "Dr. Marcus Thompson",
        category: Category::Health,
        experience: 22,
        rating: 4.9,
        bio: "Clinical psychologist specializing in cognitive behavioral therapy and workplace burnout prevention.",
        avatar: "🧠",
        specializations: &["CBT", "Stress Management", "Work-Life Balance"],
    },
    SeedExpert {
        name: "Priya Sharma",
        category: Category::Business,
        experience: 11,
        rating: 4.7,
        bio: "Product management leader who scaled products from 0 to 10M users at two unicorn startups.",
        avatar: "🎯",
        specializations: &["Product Management", "Agile", "User Research"],
    },
    SeedExpert {
        name: "Dr. Yuki Tanaka",
        category: Category::Education,
        experience: 14,
        rating: 4.8,
        bio: "Language acquisition researcher and polyglot educator. Developed immersive learning methods adopted globally.",
        avatar: "🌏",
        specializations: &["Language Learning", "Immersive Education", "Linguistics"],
    },
    SeedExpert {
        name: "Nathan Brooks",
        category: Category::Technology,
        experience: 6,
        rating: 4.6,
        bio: "Mobile app developer and Flutter advocate. Published 15+ apps with millions of downloads on both platforms.",
        avatar: "📱",
        specializations: &["Flutter", "iOS", "Android"],
    },
    SeedExpert {
        name: "Elena Vasquez",
        category: Category::Business,
        experience: 19,
        rating: 4.9,
        bio: "International trade consultant and supply chain optimization expert for Fortune 100 companies.",
        avatar: "🌍",
        specializations: &["Supply Chain", "International Trade", "Operations"],
    },
    SeedExpert {
        name: "Dr. Hannah Fischer",
        category: Category::Health,
        experience: 12,
        rating: 4.7,
        bio: "Integrative medicine practitioner blending Eastern and Western approaches. Published researcher in holistic healing.",
        avatar: "🌿",
        specializations: &["Integrative Medicine", "Ayurveda", "Mindfulness"],
    },
    SeedExpert {
        name: "Kai Nakamura",
        category: Category::Design,
        experience: 7,
        rating: 4.8,
        bio: "Game UI/UX designer who led interface design for three AAA game titles at major studios.",
        avatar: "🎮",
        specializations: &["Game UI", "Interactive Design", "Unity"],
    },
    SeedExpert {
        name: "Prof. Samuel Okonkwo",
        category: Category::Education,
        experience: 25,
        rating: 4.9,
        bio: "STEM education visionary who pioneered hands-on robotics curricula adopted in 30+ countries.",
        avatar: "🤖",
        specializations: &["STEM Education", "Robotics", "Mentorship"],
    },
    SeedExpert {
        name: "Diana Petrova",
        category: Category::Technology,
        experience: 10,
        rating: 4.7,
        bio: "Data engineering lead specializing in real-time analytics pipelines. Apache Spark and Kafka contributor.",
        avatar: "📊",
        specializations: &["Data Engineering", "Apache Spark", "Kafka"],
    },
    SeedExpert {
        name: "Carlos Mendez",
        category: Category::Business,
        experience: 14,
        rating: 4.6,
        bio: "Franchise development specialist who has helped launch 200+ franchise locations across Latin America.",
        avatar: "🏪",
        specializations: &["Franchising", "Business Development", "Scaling"],
    },
    SeedExpert {
        name: "Dr. Amara Osei",
        category: Category::Health,
        experience: 9,
        rating: 4.8,
        bio: "Dermatologist and skincare scientist. Developed clean beauty formulations for leading global brands.",
        avatar: "✨",
        specializations: &["Dermatology", "Skincare Science", "Clean Beauty"],
    },
    SeedExpert {
        name: "Liam O'Connor",
        category: Category::Design,
        experience: 13,
        rating: 4.7,
        bio: "Architectural visualization artist and industrial designer. Creates photorealistic renders for top firms.",
        avatar: "🏛️",
        specializations: &["3D Visualization", "Industrial Design", "Blender"],
    },
    SeedExpert {
        name: "Prof. Mei-Lin Wu",
        category: Category::Education,
        experience: 18,
        rating: 4.8,
        bio: "Computer science professor and competitive programming coach. Mentored multiple ICPC world finalists.",
        avatar: "🏆",
        specializations: &["Competitive Programming", "Algorithms", "CS Education"],
    },
    SeedExpert {
        name: "Zara Hussain",
        category: Category::Technology,
        experience: 5,
        rating: 4.5,
        bio: "Blockchain developer and Web3 strategist. Built DeFi protocols handling $500M+ in total value locked.",
        avatar: "⛓️",
        specializations: &["Blockchain", "Solidity", "DeFi"],
    },
    SeedExpert {
        name: "Oliver Chang",
        category: Category::Business,
        experience: 8,
        rating: 4.7,
        bio: "E-commerce strategist who helped 50+ D2C brands scale past $1M ARR through data-driven growth.",
        avatar: "🛒",
        specializations: &["E-Commerce", "D2C Growth", "Analytics"],
    },
    SeedExpert {
        name: "Dr. Ingrid Svensson",
        category: Category::Health,
        experience: 17,
        rating: 4.9,
        bio: "Sleep medicine specialist and circadian rhythm researcher. Consultant to Olympic training programs.",
        avatar: "😴",
        specializations: &["Sleep Medicine", "Circadian Health", "Performance"],
    },
    SeedExpert {
        name: "Fatima Al-Rashidi",
        category: Category::Design,
        experience: 9,
        rating: 4.8,
        bio: "Accessibility design expert who ensures digital products are inclusive. W3C accessibility guidelines contributor.",
        avatar: "♿",
        specializations: &["Accessibility", "Inclusive Design", "WCAG"],
    },
    SeedExpert {
        name: "Prof. David Nguyen",
        category: Category::Education,
        experience: 12,
        rating: 4.6,
        bio: "Finance professor and personal investing educator. His YouTube channel has 2M+ subscribers.",
        avatar: "💰",
        specializations: &["Personal Finance", "Investing", "Financial Literacy"],
    },
    SeedExpert {
        name: "Ava Mitchell",
        category: Category::Technology,
        experience: 8,
        rating: 4.7,
        bio: "DevOps engineer and site reliability expert. Reduced downtime by 99.9% at a major SaaS platform.",
        avatar: "⚙️",
        specializations: &["DevOps", "Kubernetes", "CI/CD"],
    },
    SeedExpert {
        name: "Roberto Silva",
        category: Category::Business,
        experience: 20,
        rating: 4.8,
        bio: "Executive leadership coach who has mentored 100+ C-suite leaders across Fortune 500 companies.",
        avatar: "👔",
        specializations: &["Executive Coaching", "Leadership", "Team Building"],
    },
    SeedExpert {
        name: "Dr. Nadia Kovacs",
        category: Category::Health,
        experience: 11,
        rating: 4.7,
        bio: "Physiotherapist and biomechanics researcher. Pioneered movement assessment techniques for athletes.",
        avatar: "🦴",
        specializations: &["Physiotherapy", "Biomechanics", "Injury Prevention"],
    },
    SeedExpert {
        name: "Jordan Lee",
        category: Category::Design,
        experience: 6,
        rating: 4.6,
        bio: "Product illustrator and visual storyteller. Has created iconic illustrations for Slack, Notion, and Stripe.",
        avatar: "🖌️",
        specializations: &["Illustration", "Visual Storytelling", "Procreate"],
    },
    SeedExpert {
        name: "Prof. Ana Costa",
        category: Category::Education,
        experience: 15,
        rating: 4.9,
        bio: "Early childhood education expert and Montessori curriculum designer. Author of 5 bestselling parenting books.",
        avatar: "👶",
        specializations: &["Early Childhood", "Montessori", "Parenting"],
    },
];

/// Generate slots for `days` consecutive days starting at `start`.
///
/// Each day gets between [`MIN_SLOTS_PER_DAY`] and [`MAX_SLOTS_PER_DAY`] distinct
/// time labels; each slot is pre-booked with probability [`PRE_BOOKED_RATIO`].
/// The result is ordered by (date, time).
pub fn generate_slots<R: Rng + ?Sized>(start: NaiveDate, days: u32, rng: &mut R) -> Vec<Slot> {
    let mut slots = Vec::new();

    for offset in 0..days {
        let date = start + Duration::days(i64::from(offset));
        let label = date.format("%Y-%m-%d").to_string();

        let count = rng.gen_range(MIN_SLOTS_PER_DAY..=MAX_SLOTS_PER_DAY);
        let mut picked: Vec<usize> = (0..TIME_LABELS.len()).collect();
        picked.shuffle(rng);
        picked.truncate(count);
        picked.sort_unstable();

        for index in picked {
            slots.push(Slot {
                date: label.clone(),
                time: TIME_LABELS[index].to_string(),
                is_booked: rng.gen_bool(PRE_BOOKED_RATIO),
            });
        }
    }

    slots
}

/// Replace the whole catalogue with the sample experts.
///
/// Existing bookings are deleted too, since they would reference removed experts.
/// Returns the number of experts inserted.
///
/// # Errors
///
/// Returns error if the wipe or any insert fails.
pub async fn seed_catalogue<R: Rng + ?Sized>(
    store: &PostgresExpertStore,
    start: NaiveDate,
    days: u32,
    rng: &mut R,
) -> StoreResult<usize> {
    sqlx::query("TRUNCATE bookings, expert_slots, experts")
        .execute(store.pool())
        .await
        .map_err(|e| store_error("Failed to clear catalogue", &e))?;
    tracing::info!("Cleared existing experts and bookings");

    let experts: Vec<Expert> = SAMPLE_EXPERTS
        .iter()
        .map(|sample| sample.to_expert(generate_slots(start, days, rng)))
        .collect();

    for expert in &experts {
        store.insert_expert(expert).await?;
    }

    tracing::info!(experts = experts.len(), days, "Seeded sample catalogue");
    Ok(experts.len())
}
