//! Shared test data

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::codec::ConfigCodec;

/// Trimmed PhysiCell settings file with two cell definitions
pub const SETTINGS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- settings used by the cellfit test suite -->
<PhysiCell_settings version="devel-version">
	<domain>
		<x_min>-500</x_min>
		<x_max>500</x_max>
		<y_min>-500</y_min>
		<y_max>500</y_max>
		<z_min>-10</z_min>
		<z_max>10</z_max>
		<dx>20</dx>
		<dy>20</dy>
		<dz>20</dz>
		<use_2D>true</use_2D>
	</domain>

	<overall>
		<max_time units="min">620</max_time>
		<time_units>min</time_units>
		<space_units>micron</space_units>
		<dt_diffusion units="min">0.01</dt_diffusion>
		<dt_mechanics units="min">0.1</dt_mechanics>
		<dt_phenotype units="min">6</dt_phenotype>
	</overall>

	<save>
		<folder>output</folder>
		<full_data>
			<interval units="min">60</interval>
			<enable>true</enable>
		</full_data>
	</save>

	<microenvironment_setup>
		<variable name="substrate" units="dimensionless" ID="0">
			<physical_parameter_set>
				<diffusion_coefficient units="micron^2/min">100000.0</diffusion_coefficient>
				<decay_rate units="1/min">10</decay_rate>
			</physical_parameter_set>
			<initial_condition units="mmHg">0</initial_condition>
			<Dirichlet_boundary_condition units="mmHg" enabled="false">0</Dirichlet_boundary_condition>
		</variable>
		<variable name="oxygen" units="mmHg" ID="1">
			<physical_parameter_set>
				<diffusion_coefficient units="micron^2/min">100000.0</diffusion_coefficient>
				<decay_rate units="1/min">0.1</decay_rate>
			</physical_parameter_set>
			<initial_condition units="mmHg">38</initial_condition>
			<Dirichlet_boundary_condition units="mmHg" enabled="true">38</Dirichlet_boundary_condition>
		</variable>
		<options>
			<calculate_gradients>true</calculate_gradients>
			<track_internalized_substrates_in_each_agent>false</track_internalized_substrates_in_each_agent>
		</options>
	</microenvironment_setup>

	<cell_definitions>
		<cell_definition name="default" ID="0">
			<phenotype>
				<cycle code="6" name="Flow cytometry model (separated)">
					<phase_durations units="min">
						<duration index="0" fixed_duration="false">300.0</duration>
						<duration index="1" fixed_duration="true">480</duration>
						<duration index="2" fixed_duration="true">240</duration>
						<duration index="3" fixed_duration="true">60</duration>
					</phase_durations>
				</cycle>
				<death>
					<model code="100" name="apoptosis">
						<death_rate units="1/min">5.31667e-05</death_rate>
						<phase_durations units="min">
							<duration index="0" fixed_duration="true">516</duration>
						</phase_durations>
						<parameters>
							<unlysed_fluid_change_rate units="1/min">0.05</unlysed_fluid_change_rate>
							<lysed_fluid_change_rate units="1/min">0</lysed_fluid_change_rate>
							<cytoplasmic_biomass_change_rate units="1/min">1.66667e-02</cytoplasmic_biomass_change_rate>
							<nuclear_biomass_change_rate units="1/min">5.83333e-03</nuclear_biomass_change_rate>
							<calcification_rate units="1/min">0</calcification_rate>
							<relative_rupture_volume units="dimensionless">2.0</relative_rupture_volume>
						</parameters>
					</model>
					<model code="101" name="necrosis">
						<death_rate units="1/min">0.0</death_rate>
						<phase_durations units="min">
							<duration index="0" fixed_duration="true">0</duration>
							<duration index="1" fixed_duration="true">86400</duration>
						</phase_durations>
						<parameters>
							<unlysed_fluid_change_rate units="1/min">1.11667e-2</unlysed_fluid_change_rate>
							<lysed_fluid_change_rate units="1/min">8.33333e-4</lysed_fluid_change_rate>
							<cytoplasmic_biomass_change_rate units="1/min">5.33333e-5</cytoplasmic_biomass_change_rate>
							<nuclear_biomass_change_rate units="1/min">2.16667e-3</nuclear_biomass_change_rate>
							<calcification_rate units="1/min">0</calcification_rate>
							<relative_rupture_volume units="dimensionless">2.0</relative_rupture_volume>
						</parameters>
					</model>
				</death>
				<volume>
					<total units="micron^3">2494</total>
					<fluid_fraction units="dimensionless">0.75</fluid_fraction>
					<nuclear units="micron^3">540</nuclear>
					<fluid_change_rate units="1/min">0.05</fluid_change_rate>
					<cytoplasmic_biomass_change_rate units="1/min">0.0045</cytoplasmic_biomass_change_rate>
					<nuclear_biomass_change_rate units="1/min">0.0055</nuclear_biomass_change_rate>
					<calcified_fraction units="dimensionless">0</calcified_fraction>
					<calcification_rate units="1/min">0</calcification_rate>
					<relative_rupture_volume units="dimensionless">2.0</relative_rupture_volume>
				</volume>
				<mechanics>
					<cell_cell_adhesion_strength units="micron/min">0.4</cell_cell_adhesion_strength>
					<cell_cell_repulsion_strength units="micron/min">10.0</cell_cell_repulsion_strength>
					<relative_maximum_adhesion_distance units="dimensionless">1.25</relative_maximum_adhesion_distance>
					<options>
						<set_relative_equilibrium_distance enabled="false" units="dimensionless">1.8</set_relative_equilibrium_distance>
						<set_absolute_equilibrium_distance enabled="false" units="micron">15.12</set_absolute_equilibrium_distance>
					</options>
				</mechanics>
				<motility>
					<speed units="micron/min">1</speed>
					<persistence_time units="min">1</persistence_time>
					<migration_bias units="dimensionless">0.5</migration_bias>
					<options>
						<enabled>false</enabled>
						<use_2D>true</use_2D>
						<chemotaxis>
							<enabled>false</enabled>
							<substrate>substrate</substrate>
							<direction>1</direction>
						</chemotaxis>
					</options>
				</motility>
				<secretion>
					<substrate name="substrate">
						<secretion_rate units="1/min">0</secretion_rate>
						<secretion_target units="substrate density">1</secretion_target>
						<uptake_rate units="1/min">0</uptake_rate>
						<net_export_rate units="total substrate/min">0</net_export_rate>
					</substrate>
					<substrate name="oxygen">
						<secretion_rate units="1/min">0</secretion_rate>
						<secretion_target units="substrate density">38</secretion_target>
						<uptake_rate units="1/min">10</uptake_rate>
						<net_export_rate units="total substrate/min">0</net_export_rate>
					</substrate>
				</secretion>
			</phenotype>
			<custom_data>
				<sample units="dimensionless">1.0</sample>
			</custom_data>
		</cell_definition>

		<cell_definition name="cancer" ID="1">
			<phenotype>
				<cycle code="5" name="live">
					<phase_transition_rates units="1/min">
						<rate start_index="0" end_index="0" fixed_duration="false">0.0072</rate>
					</phase_transition_rates>
				</cycle>
				<death>
					<model code="100" name="apoptosis">
						<death_rate units="1/min">0</death_rate>
						<phase_durations units="min">
							<duration index="0" fixed_duration="true">516</duration>
						</phase_durations>
					</model>
				</death>
				<volume>
					<total units="micron^3">2494</total>
					<fluid_fraction units="dimensionless">0.75</fluid_fraction>
					<nuclear units="micron^3">540</nuclear>
					<fluid_change_rate units="1/min">0.05</fluid_change_rate>
					<cytoplasmic_biomass_change_rate units="1/min">0.0045</cytoplasmic_biomass_change_rate>
					<nuclear_biomass_change_rate units="1/min">0.0055</nuclear_biomass_change_rate>
					<calcified_fraction units="dimensionless">0</calcified_fraction>
					<calcification_rate units="1/min">0</calcification_rate>
					<relative_rupture_volume units="dimensionless">2.0</relative_rupture_volume>
				</volume>
				<mechanics>
					<cell_cell_adhesion_strength units="micron/min">0.4</cell_cell_adhesion_strength>
					<cell_cell_repulsion_strength units="micron/min">10.0</cell_cell_repulsion_strength>
					<relative_maximum_adhesion_distance units="dimensionless">1.25</relative_maximum_adhesion_distance>
				</mechanics>
				<motility>
					<speed units="micron/min">2</speed>
					<persistence_time units="min">5</persistence_time>
					<migration_bias units="dimensionless">0.8</migration_bias>
					<options>
						<enabled>true</enabled>
						<use_2D>true</use_2D>
					</options>
				</motility>
			</phenotype>
		</cell_definition>
	</cell_definitions>

	<user_parameters>
		<random_seed type="int" units="dimensionless">0</random_seed>
		<number_of_cells type="int" units="none">5</number_of_cells>
		<drift type="double" units="micron/min">0.25</drift>
		<track_cells type="bool" units="none">true</track_cells>
		<label type="string" units="none"/>
	</user_parameters>
</PhysiCell_settings>
"#;

/// Scratch directory holding a copy of [`SETTINGS_XML`]
pub struct SettingsFile {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl SettingsFile {
    pub fn new() -> Self {
        Self::with_content(SETTINGS_XML)
    }

    pub fn with_content(content: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join("PhysiCell_settings.xml");
        fs::write(&path, content).unwrap();
        Self { dir, path }
    }

    pub fn codec(&self) -> ConfigCodec {
        ConfigCodec::new(&self.path)
    }

    pub fn content(&self) -> String {
        fs::read_to_string(&self.path).unwrap()
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
