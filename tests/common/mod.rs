//! Shared fixtures for the integration tests.

use std::io::Write;

use tempfile::NamedTempFile;

pub const HEADER: &str = "ID,Year_Birth,Education,Marital_Status,Income,Dt_Customer,MntWines,MntFruits,MntMeatProducts,MntFishProducts,MntSweetProducts,MntGoldProds,AcceptedCmp1,AcceptedCmp2,AcceptedCmp3,AcceptedCmp4,AcceptedCmp5,Response,Country";

/// A small dataset touching every cleaning rule:
/// - id 1: the reference customer (Age 44, Tenure 564)
/// - id 2: missing income → dropped
/// - id 3: born 1914 (Age 100) → dropped
/// - id 4: income 600000 → dropped
/// - id 5: unparseable enrollment date → kept, null tenure
/// - id 6: noise marital status and unmapped education → Other / passthrough
/// - id 7: born 1900 → dropped
pub fn marketing_rows() -> Vec<&'static str> {
    vec![
        "1,1970,Basic,Married,50000,2013-06-15,100,0,0,0,0,0,0,0,0,0,0,1,Spain",
        "2,1980,PhD,Single,,2013-01-01,10,10,10,10,10,10,0,0,0,0,0,0,Spain",
        "3,1914,Master,Widow,30000,2013-01-01,5,5,5,5,5,5,0,0,0,0,0,0,India",
        "4,1975,Graduation,Together,600000,2013-01-01,1,1,1,1,1,1,0,0,0,0,0,0,Canada",
        "5,1985,2n Cycle,Divorced,42000,not a date,20,3,40,5,1,9,1,0,1,0,0,1,Canada",
        "6,1990,Bootcamp,YOLO,61000,2014-02-01,300,20,150,30,10,40,0,1,0,0,1,0,Spain",
        "7,1900,Graduation,Married,81000,2012-10-10,500,50,300,80,60,70,0,0,0,1,1,1,Germany",
    ]
}

pub fn write_csv(header: &str, rows: &[&str]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{header}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

pub fn marketing_csv() -> NamedTempFile {
    write_csv(HEADER, &marketing_rows())
}
