use sqlx::FromRow;

/// Student record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Student {
    pub id: i64,            // assigned by the store
    pub name: String,
    pub email: String,
    pub controlnum: String, // control number issued by the institution
    pub year: i32,          // enrollment year
}

/// Validated writable fields of a student, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub controlnum: String,
    pub year: i32,
}

impl NewStudent {
    pub fn into_student(self, id: i64) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            controlnum: self.controlnum,
            year: self.year,
        }
    }
}

/// Validated subset of fields from a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub controlnum: Option<String>,
    pub year: Option<i32>,
}

impl StudentPatch {
    /// Overlays the present fields onto an existing record.
    pub fn apply(self, current: Student) -> NewStudent {
        NewStudent {
            name: self.name.unwrap_or(current.name),
            email: self.email.unwrap_or(current.email),
            controlnum: self.controlnum.unwrap_or(current.controlnum),
            year: self.year.unwrap_or(current.year),
        }
    }
}
