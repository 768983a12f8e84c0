pub mod cache;

pub use cache::{FileReferenceCache, MemoryReferenceCache, ReferenceCache};

/// Fleet served when `FLEET_VEHICLES` is not configured.
pub const DEFAULT_VEHICLES: &[&str] = &[
    "HR55AZ3114",
    "NL01AE4999",
    "NL01AE4997",
    "NL01AE4995",
    "NL01AE4993",
    "NL01AE4991",
    "NL01AE4989",
    "NL01AE4987",
    "NL01AE4985",
    "NL01AE4983",
    "NL01AE4981",
    "NL01AE4979",
    "NL01AE4975",
    "NL01AE4973",
    "NL01AE4971",
    "NL01AE4969",
    "NL01AE4967",
    "NL01AE4965",
    "NL01AE4963",
    "NL01AE4961",
    "NL01AE4959",
    "NL01AE4957",
    "NL01AE4955",
    "NL01AE4953",
    "NL01AE4951",
    "NL01AD6494",
    "NL01AD4558",
    "NL01AD4557",
    "NL01AD4556",
    "NL01AD4444",
    "NL01AD4443",
    "NL01AD4442",
    "NL01AD4441",
    "NL01AD4440",
    "NL01AE4977",
    "HR55AP7119",
    "HR55AP1908",
    "HR55AP5443",
    "HR55AP3537",
    "HR55AP9057",
    "HR55AP1181",
    "HR55AP6189",
    "HR55AP8302",
    "HR55AP3538",
    "HR55AP2933",
    "HR55AP9013",
    "HR55AP4716",
    "HR55AP6982",
    "HR55AP1569",
    "HR55AP7671",
    "HR55AP3523",
    "HR55AP0407",
    "HR55AP0740",
    "HR55AP7396",
    "HR55AP1657",
    "HR55AR2073",
    "HR55AR1287",
    "HR55AR4913",
    "HR55AR3298",
    "HR55AR2616",
    "HR55AR1698",
    "HR55AR4395",
    "HR55AR4507",
    "HR55AR2561",
    "HR55AR7377",
];

/// Parses a comma-separated vehicle list, falling back to the built-in fleet.
pub fn parse_vehicle_list(raw: Option<&str>) -> Vec<String> {
    let parsed: Vec<String> = raw
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if parsed.is_empty() {
        DEFAULT_VEHICLES.iter().map(|v| v.to_string()).collect()
    } else {
        parsed
    }
}
