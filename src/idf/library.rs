//! Materials, constructions, schedules, loads and the HVAC stub.
//!
//! The certificate only carries U-values, so opaque envelope layers are
//! emitted as massless materials with the resistance that reproduces the
//! target U-value after the standard surface-film resistances (ISO 6946:
//! external film 0.04; internal film 0.13 walls, 0.10 upward, 0.17
//! downward heat flow).

use crate::idf::object::IdfObject;
use crate::input::{BuildingType, EnvelopeInput};

/// Construction names shared between the library and the surface generator.
pub mod constructions {
    pub const EXTERIOR_WALL: &str = "Exterior_Wall_Construction";
    pub const ROOF: &str = "Roof_Construction";
    pub const GROUND_FLOOR: &str = "Ground_Floor_Construction";
    pub const INTERIOR_WALL: &str = "Interior_Wall_Construction";
    pub const INTERIOR_FLOOR: &str = "Interior_Floor_Construction";
    pub const INTERIOR_CEILING: &str = "Interior_Ceiling_Construction";
    pub const WINDOW: &str = "Window_Construction";
}

const R_SE: f64 = 0.04;
const R_SI_WALL: f64 = 0.13;
const R_SI_UP: f64 = 0.10;
const R_SI_DOWN: f64 = 0.17;

/// Layer resistance reproducing `u_value` once surface films are added.
fn layer_resistance(u_value: f64, r_si: f64) -> f64 {
    (1.0 / u_value - r_si - R_SE).max(0.05)
}

fn no_mass_material(name: &str, resistance: f64) -> IdfObject {
    IdfObject::new("Material:NoMass")
        .field(name, "Name")
        .field("Rough", "Roughness")
        .num(resistance, "Thermal Resistance {m2-K/W}")
        .num(0.9, "Thermal Absorptance")
        .num(0.7, "Solar Absorptance")
        .num(0.7, "Visible Absorptance")
}

fn single_layer_construction(name: &str, layer: &str) -> IdfObject {
    IdfObject::new("Construction")
        .field(name, "Name")
        .field(layer, "Outside Layer")
}

/// Envelope and partition materials plus their constructions.
pub fn materials(input: &EnvelopeInput) -> Vec<IdfObject> {
    let mut objects = vec![
        no_mass_material("Wall_Layer", layer_resistance(input.u_wall, R_SI_WALL)),
        single_layer_construction(constructions::EXTERIOR_WALL, "Wall_Layer"),
        no_mass_material("Roof_Layer", layer_resistance(input.u_roof, R_SI_UP)),
        single_layer_construction(constructions::ROOF, "Roof_Layer"),
        no_mass_material("Floor_Layer", layer_resistance(input.u_floor, R_SI_DOWN)),
        single_layer_construction(constructions::GROUND_FLOOR, "Floor_Layer"),
        // Interior partitions are not certificate data; nominal resistances.
        no_mass_material("Partition_Layer", 0.35),
        single_layer_construction(constructions::INTERIOR_WALL, "Partition_Layer"),
        no_mass_material("Slab_Layer", 0.25),
        // One symmetric slab layer serves both sides of the pair, so the
        // reversed partner surface sees an identical construction.
        single_layer_construction(constructions::INTERIOR_FLOOR, "Slab_Layer"),
        single_layer_construction(constructions::INTERIOR_CEILING, "Slab_Layer"),
    ];

    objects.push(
        IdfObject::new("WindowMaterial:SimpleGlazingSystem")
            .field("Glazing_Layer", "Name")
            .num(input.u_window, "U-Factor {W/m2-K}")
            .num(0.6, "Solar Heat Gain Coefficient")
            .num(0.7, "Visible Transmittance"),
    );
    objects.push(single_layer_construction(constructions::WINDOW, "Glazing_Layer"));
    objects
}

/// Schedule type limits and the constant schedules everything references.
pub fn schedules() -> Vec<IdfObject> {
    let type_limits = |name: &str, lo: &str, hi: &str, numeric: &str| {
        IdfObject::new("ScheduleTypeLimits")
            .field(name, "Name")
            .field(lo, "Lower Limit Value")
            .field(hi, "Upper Limit Value")
            .field(numeric, "Numeric Type")
    };
    let constant = |name: &str, limits: &str, value: f64| {
        IdfObject::new("Schedule:Constant")
            .field(name, "Name")
            .field(limits, "Schedule Type Limits Name")
            .num(value, "Hourly Value")
    };

    vec![
        type_limits("Fraction", "0.0", "1.0", "Continuous"),
        type_limits("Temperature", "-60.0", "200.0", "Continuous"),
        type_limits("Any_Number", "", "", "Continuous"),
        constant("Always_On", "Fraction", 1.0),
        constant("Heating_Setpoint", "Temperature", 20.0),
        constant("Cooling_Setpoint", "Temperature", 26.0),
        constant("Activity_Level", "Any_Number", 120.0),
        // 4 = dual setpoint with deadband.
        constant("Zone_Control_Type", "Any_Number", 4.0),
    ]
}

/// Areal load densities per building type in W/m2 (lighting, equipment)
/// and m2 per person.
fn load_densities(building_type: BuildingType) -> (f64, f64, f64) {
    match building_type {
        BuildingType::SingleFamily => (8.0, 4.0, 30.0),
        BuildingType::MultiFamily => (8.0, 5.0, 25.0),
        BuildingType::NonResidential => (10.0, 12.0, 12.0),
    }
}

/// Internal-load records for one zone.
pub fn zone_loads(zone: &str, building_type: BuildingType) -> Vec<IdfObject> {
    let (lighting, equipment, area_per_person) = load_densities(building_type);
    vec![
        IdfObject::new("People")
            .field(format!("{zone}_People"), "Name")
            .field(zone, "Zone or ZoneList Name")
            .field("Always_On", "Number of People Schedule Name")
            .field("People/Area", "Number of People Calculation Method")
            .field("", "Number of People")
            .num(1.0 / area_per_person, "People per Zone Floor Area {person/m2}")
            .field("", "Zone Floor Area per Person {m2/person}")
            .num(0.3, "Fraction Radiant")
            .field("autocalculate", "Sensible Heat Fraction")
            .field("Activity_Level", "Activity Level Schedule Name"),
        IdfObject::new("Lights")
            .field(format!("{zone}_Lights"), "Name")
            .field(zone, "Zone or ZoneList Name")
            .field("Always_On", "Schedule Name")
            .field("Watts/Area", "Design Level Calculation Method")
            .field("", "Lighting Level {W}")
            .num(lighting, "Watts per Zone Floor Area {W/m2}")
            .field("", "Watts per Person {W/person}")
            .num(0.0, "Return Air Fraction")
            .num(0.4, "Fraction Radiant")
            .num(0.2, "Fraction Visible"),
        IdfObject::new("ElectricEquipment")
            .field(format!("{zone}_Equipment"), "Name")
            .field(zone, "Zone or ZoneList Name")
            .field("Always_On", "Schedule Name")
            .field("Watts/Area", "Design Level Calculation Method")
            .field("", "Design Level {W}")
            .num(equipment, "Watts per Zone Floor Area {W/m2}")
            .field("", "Watts per Person {W/person}")
            .num(0.0, "Fraction Latent")
            .num(0.3, "Fraction Radiant")
            .num(0.0, "Fraction Lost"),
    ]
}

/// Infiltration record for one zone.
pub fn zone_infiltration(zone: &str, ach: f64) -> IdfObject {
    IdfObject::new("ZoneInfiltration:DesignFlowRate")
        .field(format!("{zone}_Infiltration"), "Name")
        .field(zone, "Zone or ZoneList Name")
        .field("Always_On", "Schedule Name")
        .field("AirChanges/Hour", "Design Flow Rate Calculation Method")
        .field("", "Design Flow Rate {m3/s}")
        .field("", "Flow Rate per Floor Area {m3/s-m2}")
        .field("", "Flow Rate per Exterior Surface Area {m3/s-m2}")
        .num(ach, "Air Changes per Hour {1/hr}")
        .num(1.0, "Constant Term Coefficient")
        .num(0.0, "Temperature Term Coefficient")
        .num(0.0, "Velocity Term Coefficient")
        .num(0.0, "Velocity Squared Term Coefficient")
}

/// Minimal ideal-loads HVAC stub for one zone.
///
/// Unlimited capacity, dual-setpoint thermostat. Gives the engine a
/// thermostat to resolve without modeling any plant.
pub fn zone_hvac(zone: &str) -> Vec<IdfObject> {
    vec![
        IdfObject::new("ZoneControl:Thermostat")
            .field(format!("{zone}_Thermostat"), "Name")
            .field(zone, "Zone or ZoneList Name")
            .field("Zone_Control_Type", "Control Type Schedule Name")
            .field("ThermostatSetpoint:DualSetpoint", "Control 1 Object Type")
            .field(format!("{zone}_Setpoints"), "Control 1 Name"),
        IdfObject::new("ThermostatSetpoint:DualSetpoint")
            .field(format!("{zone}_Setpoints"), "Name")
            .field("Heating_Setpoint", "Heating Setpoint Temperature Schedule Name")
            .field("Cooling_Setpoint", "Cooling Setpoint Temperature Schedule Name"),
        IdfObject::new("ZoneHVAC:EquipmentConnections")
            .field(zone, "Zone Name")
            .field(format!("{zone}_Equipment_List"), "Zone Conditioning Equipment List Name")
            .field(format!("{zone}_Supply_Node"), "Zone Air Inlet Node or NodeList Name")
            .field("", "Zone Air Exhaust Node or NodeList Name")
            .field(format!("{zone}_Air_Node"), "Zone Air Node Name")
            .field(format!("{zone}_Return_Node"), "Zone Return Air Node or NodeList Name"),
        IdfObject::new("ZoneHVAC:EquipmentList")
            .field(format!("{zone}_Equipment_List"), "Name")
            .field("SequentialLoad", "Load Distribution Scheme")
            .field("ZoneHVAC:IdealLoadsAirSystem", "Zone Equipment 1 Object Type")
            .field(format!("{zone}_Ideal_Loads"), "Zone Equipment 1 Name")
            .int(1, "Zone Equipment 1 Cooling Sequence")
            .int(1, "Zone Equipment 1 Heating or No-Load Sequence"),
        IdfObject::new("ZoneHVAC:IdealLoadsAirSystem")
            .field(format!("{zone}_Ideal_Loads"), "Name")
            .field("", "Availability Schedule Name")
            .field(format!("{zone}_Supply_Node"), "Zone Supply Air Node Name")
            .field("", "Zone Exhaust Air Node Name")
            .field("", "System Inlet Air Node Name")
            .num(50.0, "Maximum Heating Supply Air Temperature {C}")
            .num(13.0, "Minimum Cooling Supply Air Temperature {C}")
            .num(0.0156, "Maximum Heating Supply Air Humidity Ratio {kgWater/kgDryAir}")
            .num(0.0077, "Minimum Cooling Supply Air Humidity Ratio {kgWater/kgDryAir}")
            .field("NoLimit", "Heating Limit")
            .field("", "Maximum Heating Air Flow Rate {m3/s}")
            .field("", "Maximum Sensible Heating Capacity {W}")
            .field("NoLimit", "Cooling Limit")
            .field("", "Maximum Cooling Air Flow Rate {m3/s}")
            .field("", "Maximum Total Cooling Capacity {W}")
            .field("", "Heating Availability Schedule Name")
            .field("", "Cooling Availability Schedule Name")
            .field("ConstantSupplyHumidityRatio", "Dehumidification Control Type")
            .field("", "Cooling Sensible Heat Ratio")
            .field("ConstantSupplyHumidityRatio", "Humidification Control Type")
            .field("", "Design Specification Outdoor Air Object Name")
            .field("", "Outdoor Air Inlet Node Name")
            .field("None", "Demand Controlled Ventilation Type")
            .field("NoEconomizer", "Outdoor Air Economizer Type")
            .field("None", "Heat Recovery Type")
            .num(0.70, "Sensible Heat Recovery Effectiveness")
            .num(0.65, "Latent Heat Recovery Effectiveness"),
    ]
}

/// Output-variable and report declarations.
pub fn outputs() -> Vec<IdfObject> {
    let variable = |name: &str| {
        IdfObject::new("Output:Variable")
            .field("*", "Key Value")
            .field(name, "Variable Name")
            .field("Hourly", "Reporting Frequency")
    };
    vec![
        IdfObject::new("Output:VariableDictionary").field("IDF", "Key Field"),
        variable("Zone Mean Air Temperature"),
        variable("Zone Ideal Loads Supply Air Total Heating Energy"),
        variable("Zone Ideal Loads Supply Air Total Cooling Energy"),
        variable("Zone Infiltration Total Heat Loss Energy"),
        IdfObject::new("Output:Table:SummaryReports").field("AllSummary", "Report 1 Name"),
        IdfObject::new("Output:SQLite").field("SimpleAndTabular", "Option Type"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> EnvelopeInput {
        EnvelopeInput {
            net_floor_area: 150.0,
            u_wall: 0.28,
            u_roof: 0.20,
            u_floor: 0.35,
            u_window: 1.3,
            floor_count: 2,
            floor_height: 3.0,
            wall_area: None,
            roof_area: None,
            floor_area: None,
            envelope_area: None,
            gross_volume: None,
            window_areas: None,
            window_wall_ratio: None,
            infiltration_ach: 0.5,
            building_type: BuildingType::SingleFamily,
            aspect_ratio: 1.3,
        }
    }

    #[test]
    fn test_layer_resistance_reproduces_u_value() {
        let r = layer_resistance(0.28, R_SI_WALL);
        let u = 1.0 / (r + R_SI_WALL + R_SE);
        assert!((u - 0.28).abs() < 1e-9);
    }

    #[test]
    fn test_layer_resistance_floor() {
        // High U-value: resistance still positive after films.
        let r = layer_resistance(5.0, R_SI_DOWN);
        assert!(r >= 0.05);
    }

    #[test]
    fn test_materials_cover_all_constructions() {
        let objects = materials(&input());
        let names: Vec<&str> = objects
            .iter()
            .filter(|o| o.keyword == "Construction")
            .filter_map(|o| o.name())
            .collect();
        for expected in [
            constructions::EXTERIOR_WALL,
            constructions::ROOF,
            constructions::GROUND_FLOOR,
            constructions::INTERIOR_WALL,
            constructions::INTERIOR_FLOOR,
            constructions::INTERIOR_CEILING,
            constructions::WINDOW,
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_zone_hvac_references_are_consistent() {
        let objects = zone_hvac("Core_F1");
        let list = objects
            .iter()
            .find(|o| o.keyword == "ZoneHVAC:EquipmentList")
            .unwrap();
        assert_eq!(list.field_value(3), Some("Core_F1_Ideal_Loads"));
        let ideal = objects
            .iter()
            .find(|o| o.keyword == "ZoneHVAC:IdealLoadsAirSystem")
            .unwrap();
        assert_eq!(ideal.name(), Some("Core_F1_Ideal_Loads"));
        assert_eq!(ideal.field_value(2), Some("Core_F1_Supply_Node"));
    }

    #[test]
    fn test_infiltration_uses_ach() {
        let obj = zone_infiltration("Core_F1", 0.6);
        assert_eq!(obj.field_value(7), Some("0.6000"));
    }
}
