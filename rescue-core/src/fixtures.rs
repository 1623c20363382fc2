//! Built-in listing data for the simulated backend.

use crate::catalog::{Campaign, Pet, Shelter};

const UNSPLASH_PARAMS: &str = "?auto=format&fit=crop&w=800&q=80";

fn unsplash(photo: &str) -> String {
    format!("https://images.unsplash.com/{photo}{UNSPLASH_PARAMS}")
}

fn shelter(id: &str, name: &str, address: &str, phone: &str, email: &str) -> Shelter {
    Shelter {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
    }
}

/// Partner shelters in Visakhapatnam.
#[must_use]
pub fn shelters() -> Vec<Shelter> {
    vec![
        shelter(
            "1",
            "Visakhapatnam Animal Care",
            "MVP Colony, Visakhapatnam",
            "+91 9876543210",
            "contact@visakhapetcare.org",
        ),
        shelter(
            "2",
            "Helping Paws Shelter",
            "Seethammadhara, Visakhapatnam",
            "+91 9876543211",
            "info@helpingpaws.org",
        ),
        shelter(
            "3",
            "Animal Rescue and Rehabilitation",
            "Madhurawada, Visakhapatnam",
            "+91 9876543212",
            "rescue@arr.org",
        ),
    ]
}

struct PetRow {
    id: &'static str,
    name: &'static str,
    age: &'static str,
    breed: &'static str,
    photo: &'static str,
    location: &'static str,
    description: &'static str,
}

const PETS: &[PetRow] = &[
    PetRow {
        id: "1",
        name: "Buddy",
        age: "2 years",
        breed: "Labrador Mix",
        photo: "photo-1583337130417-3346a1be7dee",
        location: "Visakhapatnam Animal Care",
        description: "Buddy is a friendly and energetic Labrador mix who loves to play and go for walks. He is good with children and other dogs.",
    },
    PetRow {
        id: "2",
        name: "Luna",
        age: "1 year",
        breed: "Domestic Shorthair",
        photo: "photo-1618826411640-d6df44dd3f7a",
        location: "Helping Paws Shelter",
        description: "Luna is a playful and affectionate cat who enjoys cuddling and playing with toys. She is litter-trained and gets along well with other cats.",
    },
    PetRow {
        id: "3",
        name: "Max",
        age: "3 years",
        breed: "German Shepherd",
        photo: "photo-1553882809-a4f57e59501d",
        location: "Animal Rescue and Rehabilitation",
        description: "Max is a loyal and intelligent German Shepherd who is looking for an active family. He knows basic commands and is very protective.",
    },
    PetRow {
        id: "4",
        name: "Daisy",
        age: "4 months",
        breed: "Mixed Breed Puppy",
        photo: "photo-1583337618826-83100a73626f",
        location: "Visakhapatnam Animal Care",
        description: "Daisy is a sweet and playful puppy who is eager to learn. She is partially house-trained and would make a great family pet.",
    },
    PetRow {
        id: "5",
        name: "Oliver",
        age: "2 years",
        breed: "Tabby Cat",
        photo: "photo-1526336024174-e58f5cdd8e13",
        location: "Helping Paws Shelter",
        description: "Oliver is a calm and gentle cat who loves to nap in sunny spots. He is very affectionate and would do well in a quiet home.",
    },
    PetRow {
        id: "6",
        name: "Rocky",
        age: "5 years",
        breed: "Pit Bull Mix",
        photo: "photo-1535930891776-0c2dfb7fda1a",
        location: "Animal Rescue and Rehabilitation",
        description: "Rocky is a strong and loyal dog who needs an experienced owner. He is well-trained and has a lot of love to give to the right family.",
    },
];

/// Pets currently open for adoption.
#[must_use]
pub fn pets() -> Vec<Pet> {
    PETS.iter()
        .map(|row| Pet {
            id: row.id.to_string(),
            name: row.name.to_string(),
            age: row.age.to_string(),
            breed: row.breed.to_string(),
            image: unsplash(row.photo),
            location: row.location.to_string(),
            description: row.description.to_string(),
            for_adoption: true,
        })
        .collect()
}

struct CampaignRow {
    id: &'static str,
    title: &'static str,
    photo: &'static str,
    description: &'static str,
    target: u64,
    raised: u64,
    days_left: u32,
}

const CAMPAIGNS: &[CampaignRow] = &[
    CampaignRow {
        id: "1",
        title: "Emergency Medical Fund",
        photo: "photo-1527525443983-6e60c75fff46",
        description: "Help us cover the medical expenses for injured strays and rescued animals in need of urgent care.",
        target: 50_000,
        raised: 32_450,
        days_left: 12,
    },
    CampaignRow {
        id: "2",
        title: "Shelter Expansion Project",
        photo: "photo-1551730459-92db2a308d6a",
        description: "We are expanding our shelter to accommodate more animals. Your contribution will help build new kennels and play areas.",
        target: 200_000,
        raised: 85_600,
        days_left: 30,
    },
    CampaignRow {
        id: "3",
        title: "Sterilization Drive",
        photo: "photo-1568572933382-74d440642117",
        description: "Support our initiative to control the stray animal population in Visakhapatnam through humane sterilization programs.",
        target: 75_000,
        raised: 47_800,
        days_left: 15,
    },
    CampaignRow {
        id: "4",
        title: "Winter Shelter for Strays",
        photo: "photo-1574158622682-e40e69881006",
        description: "Help us provide warm shelters, blankets, and food for stray animals during the cold winter months.",
        target: 30_000,
        raised: 18_900,
        days_left: 20,
    },
];

/// Running fundraising campaigns.
#[must_use]
pub fn campaigns() -> Vec<Campaign> {
    CAMPAIGNS
        .iter()
        .map(|row| Campaign {
            id: row.id.to_string(),
            title: row.title.to_string(),
            image: unsplash(row.photo),
            description: row.description.to_string(),
            target_amount: row.target,
            raised_amount: row.raised,
            days_left: row.days_left,
        })
        .collect()
}
