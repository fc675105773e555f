//! Embedded sample datasets, mirroring the "download sample CSV" fixtures
//! the dashboard views ship with. Also used as test fixtures.

use std::str::FromStr;

/// Wide-format sensor readings: timestamp plus four sensor columns.
pub const SENSORS_CSV: &str = "\
Timestamp,Sensor_A,Sensor_B,Sensor_C,Sensor_D
2025-08-01 08:00,23.5,21.8,24.0,22.6
2025-08-01 12:00,24.1,22.0,24.3,22.9
2025-08-01 16:00,23.8,21.7,24.1,22.7
2025-08-02 08:00,23.2,21.3,23.6,22.1
2025-08-02 12:00,24.6,22.6,24.8,23.0
2025-08-02 16:00,25.0,23.1,25.2,23.6
2025-08-03 08:00,24.3,22.4,24.5,22.8
2025-08-03 12:00,23.9,22.0,24.2,22.5
2025-08-03 16:00,23.1,21.5,23.7,22.0
";

/// Daily case counts for three locations.
pub const EPI_CSV: &str = "\
Date,Location,Confirmed,Recovered,Deaths
2025-08-01,CityA,10,0,0
2025-08-02,CityA,12,1,0
2025-08-03,CityA,15,2,0
2025-08-01,CityB,5,0,0
2025-08-02,CityB,7,0,0
2025-08-03,CityB,9,1,0
2025-08-01,CityC,20,1,1
2025-08-02,CityC,22,2,1
2025-08-03,CityC,25,3,1
";

/// Ten-row employee roster, all rows valid.
pub const EMPLOYEES_CSV: &str = "\
EmployeeID,Name,PhoneNumber,Department,Salary,ExperienceYears
E001,Rahul,9876543210,HR,50000,5
E002,Priya,9876501234,IT,75000,8
E003,Arjun,9123456789,Finance,62000,6
E004,Meena,9988776655,IT,80000,10
E005,Kiran,9876123456,HR,55000,4
E006,Anita,9765432109,Sales,45000,3
E007,Vikram,9877001122,Finance,67000,7
E008,Sneha,9654321098,Sales,47000,2
E009,Manoj,9876665544,IT,72000,9
E010,Divya,9766002211,HR,53000,5
";

/// Selectable sample dataset for the `sample` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDataset {
    Sensors,
    Epi,
    Employees,
}

impl SampleDataset {
    pub fn csv(self) -> &'static str {
        match self {
            SampleDataset::Sensors => SENSORS_CSV,
            SampleDataset::Epi => EPI_CSV,
            SampleDataset::Employees => EMPLOYEES_CSV,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            SampleDataset::Sensors => "sensors_sample.csv",
            SampleDataset::Epi => "covid_sample.csv",
            SampleDataset::Employees => "employees_sample.csv",
        }
    }
}

impl FromStr for SampleDataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sensors" => Ok(SampleDataset::Sensors),
            "epi" | "covid" => Ok(SampleDataset::Epi),
            "employees" => Ok(SampleDataset::Employees),
            other => Err(format!(
                "unknown sample dataset '{other}' (sensors|epi|employees)"
            )),
        }
    }
}
