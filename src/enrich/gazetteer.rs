use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::app::{Result, TributaryError};

const COUNTRIES: &[(&str, &[&str])] = &[
    ("AE", &["United Arab Emirates", "UAE"]),
    ("AF", &["Afghanistan"]),
    ("AR", &["Argentina"]),
    ("AT", &["Austria"]),
    ("AU", &["Australia"]),
    ("BD", &["Bangladesh"]),
    ("BE", &["Belgium"]),
    ("BR", &["Brazil"]),
    ("CA", &["Canada"]),
    ("CH", &["Switzerland"]),
    ("CL", &["Chile"]),
    ("CN", &["China", "People's Republic of China"]),
    ("CO", &["Colombia"]),
    ("CU", &["Cuba"]),
    ("CZ", &["Czech Republic", "Czechia"]),
    ("DE", &["Germany"]),
    ("DK", &["Denmark"]),
    ("EG", &["Egypt"]),
    ("ES", &["Spain"]),
    ("ET", &["Ethiopia"]),
    ("FI", &["Finland"]),
    ("FR", &["France"]),
    ("GB", &["United Kingdom", "UK", "Britain", "Great Britain", "England", "Scotland", "Wales"]),
    ("GR", &["Greece"]),
    ("HK", &["Hong Kong"]),
    ("HU", &["Hungary"]),
    ("ID", &["Indonesia"]),
    ("IE", &["Ireland"]),
    ("IL", &["Israel"]),
    ("IN", &["India"]),
    ("IQ", &["Iraq"]),
    ("IR", &["Iran"]),
    ("IT", &["Italy"]),
    ("JP", &["Japan"]),
    ("KE", &["Kenya"]),
    ("KH", &["Cambodia"]),
    ("KP", &["North Korea"]),
    ("KR", &["South Korea", "Korea"]),
    ("LA", &["Laos"]),
    ("LB", &["Lebanon"]),
    ("LK", &["Sri Lanka"]),
    ("MM", &["Myanmar", "Burma"]),
    ("MX", &["Mexico"]),
    ("MY", &["Malaysia"]),
    ("NG", &["Nigeria"]),
    ("NL", &["Netherlands", "Holland"]),
    ("NO", &["Norway"]),
    ("NZ", &["New Zealand"]),
    ("PE", &["Peru"]),
    ("PH", &["Philippines"]),
    ("PK", &["Pakistan"]),
    ("PL", &["Poland"]),
    ("PT", &["Portugal"]),
    ("QA", &["Qatar"]),
    ("RO", &["Romania"]),
    ("RU", &["Russia", "Russian Federation"]),
    ("SA", &["Saudi Arabia"]),
    ("SE", &["Sweden"]),
    ("SG", &["Singapore"]),
    ("SY", &["Syria"]),
    ("TH", &["Thailand"]),
    ("TR", &["Turkey", "Türkiye"]),
    ("TW", &["Taiwan"]),
    ("UA", &["Ukraine"]),
    ("US", &["United States", "United States of America", "USA", "America"]),
    ("VE", &["Venezuela"]),
    ("VN", &["Vietnam", "Viet Nam"]),
    ("ZA", &["South Africa"]),
];

const CITIES: &[(&str, &str, u64)] = &[
    ("Amsterdam", "NL", 741_636),
    ("Bangkok", "TH", 5_104_476),
    ("Beijing", "CN", 11_716_620),
    ("Berlin", "DE", 3_426_354),
    ("Buenos Aires", "AR", 13_076_300),
    ("Cairo", "EG", 7_734_614),
    ("Chicago", "US", 2_720_546),
    ("Delhi", "IN", 10_927_986),
    ("Dubai", "AE", 1_137_347),
    ("Guangzhou", "CN", 11_071_424),
    ("Hanoi", "VN", 1_431_270),
    ("Istanbul", "TR", 14_804_116),
    ("Jakarta", "ID", 8_540_121),
    ("Kuala Lumpur", "MY", 1_453_975),
    ("Lagos", "NG", 9_000_000),
    ("London", "GB", 7_556_900),
    ("Los Angeles", "US", 3_971_883),
    ("Madrid", "ES", 3_255_944),
    ("Manila", "PH", 1_600_000),
    ("Melbourne", "AU", 4_246_375),
    ("Mexico City", "MX", 12_294_193),
    ("Moscow", "RU", 10_381_222),
    ("Mumbai", "IN", 12_691_836),
    ("Nairobi", "KE", 2_750_547),
    ("New York", "US", 8_175_133),
    ("Osaka", "JP", 2_592_413),
    ("Paris", "FR", 2_138_551),
    ("Rome", "IT", 2_318_895),
    ("San Diego", "US", 1_394_928),
    ("San Francisco", "US", 864_816),
    ("Sao Paulo", "BR", 10_021_295),
    ("Seoul", "KR", 10_349_312),
    ("Shanghai", "CN", 22_315_474),
    ("Shenzhen", "CN", 10_358_381),
    ("Sydney", "AU", 4_627_345),
    ("Taipei", "TW", 7_871_900),
    ("Tehran", "IR", 7_153_309),
    ("Tokyo", "JP", 8_336_599),
    ("Toronto", "CA", 2_600_000),
    ("Washington", "US", 601_723),
];

// GeoNames `cities500.txt` column positions
const GN_NAME: usize = 1;
const GN_ASCII_NAME: usize = 2;
const GN_COUNTRY: usize = 8;
const GN_POPULATION: usize = 14;

#[derive(Debug, Clone)]
struct CityEntry {
    country_code: String,
    population: u64,
}

/// Place-name lookup tables for country detection.
///
/// Names are matched case-insensitively. A city name shared by several places resolves to
/// the most populous one.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    countries: HashMap<String, String>,
    cities: HashMap<String, CityEntry>,
    max_words: usize,
}

impl Gazetteer {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut gazetteer = Self::empty();
        for (code, names) in COUNTRIES {
            for name in *names {
                gazetteer.add_country(name, code);
            }
        }
        for (name, code, population) in CITIES {
            gazetteer.add_city(name, code, *population);
        }
        gazetteer
    }

    pub fn add_country(&mut self, name: &str, code: &str) {
        let key = normalize(name);
        self.track_words(&key);
        self.countries.insert(key, code.to_uppercase());
    }

    pub fn add_city(&mut self, name: &str, code: &str, population: u64) {
        let key = normalize(name);
        if key.is_empty() || code.is_empty() {
            return;
        }
        self.track_words(&key);

        let candidate = CityEntry {
            country_code: code.to_uppercase(),
            population,
        };
        self.cities
            .entry(key)
            .and_modify(|existing| {
                if candidate.population > existing.population {
                    *existing = candidate.clone();
                }
            })
            .or_insert(candidate);
    }

    pub fn country(&self, phrase: &str) -> Option<&str> {
        self.countries.get(&normalize(phrase)).map(String::as_str)
    }

    pub fn city_country(&self, phrase: &str) -> Option<&str> {
        self.cities
            .get(&normalize(phrase))
            .map(|c| c.country_code.as_str())
    }

    /// Longest name in the tables, in words.
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    /// Add cities from a GeoNames dump file.
    pub fn load_geonames<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let file = File::open(path.as_ref())?;
        self.extend_from_geonames(BufReader::new(file))
    }

    /// Add cities from tab-separated GeoNames rows. Returns the number of rows read.
    pub fn extend_from_geonames<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut rows = 0;
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let columns: Vec<&str> = line.split('\t').collect();
            if columns.len() <= GN_POPULATION {
                return Err(TributaryError::Config(format!(
                    "gazetteer line {} has {} columns, expected at least {}",
                    line_no + 1,
                    columns.len(),
                    GN_POPULATION + 1
                )));
            }

            let code = columns[GN_COUNTRY];
            let population = columns[GN_POPULATION].parse().unwrap_or(0);
            self.add_city(columns[GN_NAME], code, population);
            if columns[GN_ASCII_NAME] != columns[GN_NAME] {
                self.add_city(columns[GN_ASCII_NAME], code, population);
            }
            rows += 1;
        }
        Ok(rows)
    }

    fn track_words(&mut self, key: &str) {
        self.max_words = self.max_words.max(key.split(' ').count());
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
