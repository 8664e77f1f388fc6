#![forbid(unsafe_code)]

pub mod roles {
    pub const ROLES: &[&str] = &["DIRECTEUR", "CONSULTANT", "CLIENT"];

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum UserRole {
        Directeur,
        Consultant,
        Client,
    }

    impl UserRole {
        pub fn as_str(self) -> &'static str {
            match self {
                UserRole::Directeur => "DIRECTEUR",
                UserRole::Consultant => "CONSULTANT",
                UserRole::Client => "CLIENT",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "DIRECTEUR" => Some(UserRole::Directeur),
                "CONSULTANT" => Some(UserRole::Consultant),
                "CLIENT" => Some(UserRole::Client),
                _ => None,
            }
        }

        /// Access rank: a caller satisfies a gate when its rank is at
        /// least the gate's rank.
        pub fn rank(self) -> u8 {
            match self {
                UserRole::Directeur => 3,
                UserRole::Consultant => 2,
                UserRole::Client => 1,
            }
        }

        pub fn at_least(self, required: UserRole) -> bool {
            self.rank() >= required.rank()
        }
    }
}

pub mod status {
    pub const PROJECT_STATUSES: &[&str] = &["A_FAIRE", "EN_COURS", "TERMINE", "SUSPENDU"];
    pub const TASK_STATUSES: &[&str] = &["A_FAIRE", "EN_COURS", "TERMINE"];
    pub const PRIORITIES: &[&str] = &["FAIBLE", "MOYENNE", "HAUTE", "CRITIQUE"];

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ProjectStatus {
        AFaire,
        EnCours,
        Termine,
        Suspendu,
    }

    impl ProjectStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                ProjectStatus::AFaire => "A_FAIRE",
                ProjectStatus::EnCours => "EN_COURS",
                ProjectStatus::Termine => "TERMINE",
                ProjectStatus::Suspendu => "SUSPENDU",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "A_FAIRE" => Some(ProjectStatus::AFaire),
                "EN_COURS" => Some(ProjectStatus::EnCours),
                "TERMINE" => Some(ProjectStatus::Termine),
                "SUSPENDU" => Some(ProjectStatus::Suspendu),
                _ => None,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum TaskStatus {
        AFaire,
        EnCours,
        Termine,
    }

    impl TaskStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                TaskStatus::AFaire => "A_FAIRE",
                TaskStatus::EnCours => "EN_COURS",
                TaskStatus::Termine => "TERMINE",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "A_FAIRE" => Some(TaskStatus::AFaire),
                "EN_COURS" => Some(TaskStatus::EnCours),
                "TERMINE" => Some(TaskStatus::Termine),
                _ => None,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Priority {
        Faible,
        Moyenne,
        Haute,
        Critique,
    }

    impl Priority {
        pub fn as_str(self) -> &'static str {
            match self {
                Priority::Faible => "FAIBLE",
                Priority::Moyenne => "MOYENNE",
                Priority::Haute => "HAUTE",
                Priority::Critique => "CRITIQUE",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "FAIBLE" => Some(Priority::Faible),
                "MOYENNE" => Some(Priority::Moyenne),
                "HAUTE" => Some(Priority::Haute),
                "CRITIQUE" => Some(Priority::Critique),
                _ => None,
            }
        }
    }
}

pub mod finance {
    pub const TRANSACTION_TYPES: &[&str] = &["ENTREE", "SORTIE"];
    pub const TRANSACTION_CATEGORIES: &[&str] = &[
        "REVENUS_PROJET",
        "SALAIRE_CONSULTANT",
        "FRAIS_DEPLACEMENT",
        "FRAIS_MATERIELS",
    ];

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum TransactionType {
        Entree,
        Sortie,
    }

    impl TransactionType {
        pub fn as_str(self) -> &'static str {
            match self {
                TransactionType::Entree => "ENTREE",
                TransactionType::Sortie => "SORTIE",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "ENTREE" => Some(TransactionType::Entree),
                "SORTIE" => Some(TransactionType::Sortie),
                _ => None,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum TransactionCategory {
        RevenusProjet,
        SalaireConsultant,
        FraisDeplacement,
        FraisMateriels,
    }

    impl TransactionCategory {
        pub fn as_str(self) -> &'static str {
            match self {
                TransactionCategory::RevenusProjet => "REVENUS_PROJET",
                TransactionCategory::SalaireConsultant => "SALAIRE_CONSULTANT",
                TransactionCategory::FraisDeplacement => "FRAIS_DEPLACEMENT",
                TransactionCategory::FraisMateriels => "FRAIS_MATERIELS",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "REVENUS_PROJET" => Some(TransactionCategory::RevenusProjet),
                "SALAIRE_CONSULTANT" => Some(TransactionCategory::SalaireConsultant),
                "FRAIS_DEPLACEMENT" => Some(TransactionCategory::FraisDeplacement),
                "FRAIS_MATERIELS" => Some(TransactionCategory::FraisMateriels),
                _ => None,
            }
        }
    }
}

pub mod notify {
    pub const NOTIFICATION_TYPES: &[&str] = &[
        "ASSIGNATION_TACHE",
        "CHANGEMENT_STATUT",
        "PAIEMENT",
        "DEPASSEMENT_BUDGET",
        "DEADLINE_PROCHE",
    ];

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum NotificationType {
        AssignationTache,
        ChangementStatut,
        Paiement,
        DepassementBudget,
        DeadlineProche,
    }

    impl NotificationType {
        pub fn as_str(self) -> &'static str {
            match self {
                NotificationType::AssignationTache => "ASSIGNATION_TACHE",
                NotificationType::ChangementStatut => "CHANGEMENT_STATUT",
                NotificationType::Paiement => "PAIEMENT",
                NotificationType::DepassementBudget => "DEPASSEMENT_BUDGET",
                NotificationType::DeadlineProche => "DEADLINE_PROCHE",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "ASSIGNATION_TACHE" => Some(NotificationType::AssignationTache),
                "CHANGEMENT_STATUT" => Some(NotificationType::ChangementStatut),
                "PAIEMENT" => Some(NotificationType::Paiement),
                "DEPASSEMENT_BUDGET" => Some(NotificationType::DepassementBudget),
                "DEADLINE_PROCHE" => Some(NotificationType::DeadlineProche),
                _ => None,
            }
        }
    }
}

pub mod ids {
    /// Entity ids look like `PRJ-042`: an uppercase ASCII prefix, a dash,
    /// then a zero-padded counter.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum EntityIdError {
        Empty,
        TooLong,
        MissingDash,
        InvalidPrefix,
        InvalidCounter,
    }

    pub fn validate_entity_id(value: &str) -> Result<(), EntityIdError> {
        if value.is_empty() {
            return Err(EntityIdError::Empty);
        }
        if value.len() > 32 {
            return Err(EntityIdError::TooLong);
        }
        let Some((prefix, counter)) = value.split_once('-') else {
            return Err(EntityIdError::MissingDash);
        };
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(EntityIdError::InvalidPrefix);
        }
        if counter.is_empty() || !counter.chars().all(|c| c.is_ascii_digit()) {
            return Err(EntityIdError::InvalidCounter);
        }
        Ok(())
    }

    pub fn is_entity_id(value: &str) -> bool {
        validate_entity_id(value).is_ok()
    }
}

pub mod email {
    /// Loose shape check: one `@`, non-empty local part, a dot somewhere
    /// in a non-empty domain. Deliverability is not this layer's problem.
    pub fn is_valid_email(value: &str) -> bool {
        let value = value.trim();
        let Some((local, domain)) = value.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.is_empty() {
            return false;
        }
        if domain.contains('@') || !domain.contains('.') {
            return false;
        }
        if domain.starts_with('.') || domain.ends_with('.') {
            return false;
        }
        !value.contains(char::is_whitespace)
    }
}
