use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::UViewError;
use crate::record::{Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Active,
    Inactive,
    Pending,
    Blacklisted,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Active,
        Status::Inactive,
        Status::Pending,
        Status::Blacklisted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Pending => "Pending",
            Status::Blacklisted => "Blacklisted",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UViewError::LoadingFailed(format!("unknown status {s:?}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub phone_number: String,
    pub email_address: String,
    pub bvn: String,
    pub gender: String,
    pub marital_status: String,
    pub children: String,
    pub type_of_residence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEmployment {
    pub level_of_education: String,
    pub employment_status: String,
    pub sector_of_employment: String,
    pub duration_of_employment: String,
    pub office_email: String,
    pub monthly_income: String,
    pub loan_repayment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Socials {
    pub twitter: String,
    pub facebook: String,
    pub instagram: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Guarantor {
    pub full_name: String,
    pub phone_number: String,
    pub email_address: String,
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub organization: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub created_at: String,
    pub status: Status,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_balance: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub education_employment: EducationEmployment,
    #[serde(default)]
    pub socials: Socials,
    #[serde(default)]
    pub guarantor: Guarantor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl Record for User {
    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn field(&self, accessor: &str) -> Option<String> {
        if let Some((group, name)) = accessor.split_once('.') {
            return self.nested_field(group, name);
        }
        let value = match accessor {
            "id" => self.id.to_string(),
            "organization" => self.organization.clone(),
            "username" => self.username.clone(),
            "email" => self.email.clone(),
            "phone" => self.phone.clone(),
            "createdAt" => self.created_at.clone(),
            "status" => self.status.to_string(),
            "accountNumber" => self.account_number.clone(),
            "accountBalance" => self.account_balance.clone(),
            "bankName" => self.bank_name.clone(),
            "profileImage" => self.profile_image.clone()?,
            _ => return None,
        };
        Some(value)
    }
}

impl User {
    fn nested_field(&self, group: &str, name: &str) -> Option<String> {
        let value = match (group, name) {
            ("personalInfo", "fullName") => &self.personal_info.full_name,
            ("personalInfo", "phoneNumber") => &self.personal_info.phone_number,
            ("personalInfo", "emailAddress") => &self.personal_info.email_address,
            ("personalInfo", "bvn") => &self.personal_info.bvn,
            ("personalInfo", "gender") => &self.personal_info.gender,
            ("personalInfo", "maritalStatus") => &self.personal_info.marital_status,
            ("personalInfo", "children") => &self.personal_info.children,
            ("personalInfo", "typeOfResidence") => &self.personal_info.type_of_residence,
            ("educationEmployment", "levelOfEducation") => {
                &self.education_employment.level_of_education
            }
            ("educationEmployment", "employmentStatus") => {
                &self.education_employment.employment_status
            }
            ("educationEmployment", "sectorOfEmployment") => {
                &self.education_employment.sector_of_employment
            }
            ("educationEmployment", "durationOfEmployment") => {
                &self.education_employment.duration_of_employment
            }
            ("educationEmployment", "officeEmail") => &self.education_employment.office_email,
            ("educationEmployment", "monthlyIncome") => &self.education_employment.monthly_income,
            ("educationEmployment", "loanRepayment") => &self.education_employment.loan_repayment,
            ("socials", "twitter") => &self.socials.twitter,
            ("socials", "facebook") => &self.socials.facebook,
            ("socials", "instagram") => &self.socials.instagram,
            ("guarantor", "fullName") => &self.guarantor.full_name,
            ("guarantor", "phoneNumber") => &self.guarantor.phone_number,
            ("guarantor", "emailAddress") => &self.guarantor.email_address,
            ("guarantor", "relationship") => &self.guarantor.relationship,
            _ => return None,
        };
        Some(value.clone())
    }
}

pub fn load_users(path: &Path) -> Result<Vec<User>, UViewError> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(UViewError::LoadingFailed("Not a file!".into()));
    }
    let start_time = Instant::now();
    let content = fs::read_to_string(path)?;
    let users: Vec<User> = serde_json::from_str(&content)?;
    info!(
        "Loaded {} users from {} in {}ms",
        users.len(),
        path.display(),
        start_time.elapsed().as_millis()
    );
    Ok(users)
}

const ORGANIZATIONS: [&str; 5] = ["Lendsqr", "Irorun", "Lendstar", "Paylater", "Kredi"];
const FIRST_NAMES: [&str; 6] = ["Grace", "Tosin", "Debby", "Adedeji", "Ifeoma", "Musa"];
const LAST_NAMES: [&str; 5] = ["Effiom", "Dokunmu", "Ogana", "Bello", "Okafor"];

/// Deterministic mock users, used when no users document is given.
pub fn generate_users(count: usize) -> Vec<User> {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN);
    (1..=count)
        .map(|i| {
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()];
            let username = format!("{first}{last}{i}");
            let organization = ORGANIZATIONS[i % ORGANIZATIONS.len()].to_string();
            let joined = base + Duration::days((i * 7 % 1400) as i64);
            let phone = format!("080{:08}", i * 7919 % 100_000_000);
            let email = format!("{}@{}.com", username.to_lowercase(), organization.to_lowercase());
            User {
                id: RecordId::from(i),
                organization: organization.clone(),
                username: username.clone(),
                email: email.clone(),
                phone: phone.clone(),
                created_at: format!("{}T{:02}:30:00+01:00", joined.format("%Y-%m-%d"), 8 + i % 10),
                status: Status::ALL[i % Status::ALL.len()],
                account_number: format!("{:010}", i * 104_729 % 10_000_000_000),
                account_balance: format!("{}.00", i * 1_250 % 500_000),
                bank_name: format!("{organization} Bank"),
                personal_info: PersonalInfo {
                    full_name: format!("{first} {last}"),
                    phone_number: phone.clone(),
                    email_address: email,
                    bvn: format!("{:011}", i * 7_368_787 % 100_000_000_000),
                    gender: if i % 2 == 0 { "Female" } else { "Male" }.to_string(),
                    marital_status: if i % 3 == 0 { "Married" } else { "Single" }.to_string(),
                    children: if i % 4 == 0 { "None".to_string() } else { (i % 4).to_string() },
                    type_of_residence: "Parent's Apartment".to_string(),
                },
                education_employment: EducationEmployment {
                    level_of_education: "B.Sc".to_string(),
                    employment_status: "Employed".to_string(),
                    sector_of_employment: "FinTech".to_string(),
                    duration_of_employment: format!("{} years", 1 + i % 6),
                    office_email: format!("{}@{}.com", first.to_lowercase(), organization.to_lowercase()),
                    monthly_income: format!("{}.00 - {}.00", 200_000 + i % 5 * 50_000, 400_000 + i % 5 * 50_000),
                    loan_repayment: format!("{}", 40_000 + i % 9 * 5_000),
                },
                socials: Socials {
                    twitter: format!("@{}", username.to_lowercase()),
                    facebook: format!("{first} {last}"),
                    instagram: format!("@{}", username.to_lowercase()),
                },
                guarantor: Guarantor {
                    full_name: format!("{} {last}", FIRST_NAMES[(i + 3) % FIRST_NAMES.len()]),
                    phone_number: format!("070{:08}", i * 1_299_709 % 100_000_000),
                    email_address: format!("guarantor{i}@gmail.com"),
                    relationship: if i % 2 == 0 { "Sister" } else { "Brother" }.to_string(),
                },
                profile_image: None,
            }
        })
        .collect()
}
