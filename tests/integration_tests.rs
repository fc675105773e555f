use chartprep::clean::{clean_employees, read_employees};
use chartprep::epi::{self, CaseMode};
use chartprep::ingest::read_table;
use chartprep::samples::{EMPLOYEES_CSV, EPI_CSV, SENSORS_CSV};
use chartprep::sensors::SensorTable;
use chartprep::stats::boxplot_by_group;

#[test]
fn test_employee_pipeline_on_sample() {
    let raw = read_employees(EMPLOYEES_CSV.as_bytes()).expect("Failed to read employee sample");
    let (cleaned, report) = clean_employees(&raw);

    // The shipped roster is fully valid
    assert_eq!(report.input_rows, 10);
    assert_eq!(cleaned.len(), 10);
    assert_eq!(report.duplicate_id, 0);
    assert_eq!(cleaned[0].id, "E001");
    assert_eq!(cleaned[0].salary, 50000.0);
}

#[test]
fn test_epi_pipeline_on_sample() {
    let table = read_table(EPI_CSV.as_bytes()).expect("Failed to read epi sample");
    let (rows, skipped) = epi::normalize(&table);
    assert_eq!(skipped, 0);
    assert_eq!(rows.len(), 9);
    assert_eq!(epi::locations(&rows), vec!["CityA", "CityB", "CityC"]);

    let report = epi::aggregate(&rows, "CityA", CaseMode::Daily, 7).expect("aggregate failed");
    let cumulative: Vec<f64> = report.series.iter().map(|p| p.cumulative).collect();
    assert_eq!(cumulative, vec![10.0, 22.0, 37.0]);
    assert!(cumulative.windows(2).all(|w| w[0] <= w[1]));

    assert_eq!(report.summary.total_confirmed, 37.0);
    assert_eq!(report.summary.total_recovered, 3.0);
    assert_eq!(report.summary.total_deaths, 0.0);
    assert_eq!(report.summary.cfr_percent, 0.0);
    assert_eq!(report.summary.active, 34.0);
    assert_eq!(report.summary.latest_new_cases, Some(15.0));
}

#[test]
fn test_epi_cumulative_mode_on_running_totals() {
    // Same location rewritten as a running total should come out identical
    let csv = "\
Date,Location,Confirmed,Recovered,Deaths
2025-08-01,CityA,10,0,0
2025-08-02,CityA,22,1,0
2025-08-03,CityA,37,2,0
";
    let table = read_table(csv.as_bytes()).unwrap();
    let (rows, _) = epi::normalize(&table);
    let report = epi::aggregate(&rows, "CityA", CaseMode::Cumulative, 7).unwrap();

    let new_cases: Vec<f64> = report.series.iter().map(|p| p.new_cases).collect();
    assert_eq!(new_cases, vec![10.0, 12.0, 15.0]);
    assert_eq!(report.summary.total_confirmed, 37.0);
}

#[test]
fn test_sensor_pipeline_on_sample() {
    let table = read_table(SENSORS_CSV.as_bytes()).expect("Failed to read sensor sample");
    let sensors = SensorTable::from_table(&table).expect("sensor extraction failed");

    assert_eq!(sensors.timestamps.len(), 9);
    assert_eq!(sensors.sensors.len(), 4);
    for series in &sensors.sensors {
        assert_eq!(series.values.len(), 9);
    }

    let smoothed = sensors.smoothed(3).expect("smoothing failed");
    assert_eq!(smoothed.sensors[0].values.len(), 9);
    // First element of a trailing window is the raw reading
    assert_eq!(smoothed.sensors[0].values[0], Some(23.5));

    let alerts = sensors.scan_alerts(Some(22.0), Some(25.0));
    assert_eq!(alerts.len(), 4);
    let sensor_a = &alerts[0];
    assert_eq!(sensor_a.sensor, "Sensor_A");
    assert_eq!(sensor_a.below_low, 0);
    // 25.0 is not strictly above the bound
    assert_eq!(sensor_a.above_high, 0);
}

#[test]
fn test_boxplot_over_long_format_file() {
    let csv = "\
Location,Temperature
Chennai,30
Chennai,32
Chennai,33
Chennai,29
Mumbai,28
Mumbai,29
Mumbai,27
Mumbai,30
";
    let table = read_table(csv.as_bytes()).unwrap();
    let groups = boxplot_by_group(&table, "Location", "Temperature").unwrap();
    assert_eq!(groups.len(), 2);
    for g in &groups {
        assert!(g.stats.min <= g.stats.q1);
        assert!(g.stats.q1 <= g.stats.median);
        assert!(g.stats.median <= g.stats.q3);
        assert!(g.stats.q3 <= g.stats.max);
    }
}
