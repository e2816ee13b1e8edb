mod greenhouse_tests {
    use crate::core::actuators::ActuationResolved;
    use crate::core::greenhouse::{simulate, SimulationError};
    use crate::core::results::SimulationResult;
    use crate::input::{
        AirProps, BaselinePlantParams, BuildingParams, CouplingParams, Geometry, Initial, Outside,
    };
    use crate::simulation_time::SimulationTime;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    struct Greenhouse {
        geometry: Geometry,
        outside: Outside,
        initial: Initial,
        building: BuildingParams,
        coupling: CouplingParams,
    }

    impl Greenhouse {
        fn run(
            &self,
            actuation: &ActuationResolved,
            crop_area: Option<f64>,
            simulation_time: &SimulationTime,
        ) -> Result<SimulationResult, SimulationError> {
            simulate(
                &self.geometry,
                &self.outside,
                &self.initial,
                &self.building,
                actuation,
                &self.coupling,
                &BaselinePlantParams::default(),
                &AirProps::default(),
                crop_area,
                simulation_time,
            )
        }
    }

    #[fixture]
    fn winter_greenhouse() -> Greenhouse {
        Greenhouse {
            geometry: Geometry::new(20., 10., 4.),
            outside: Outside::new(-10., 70., 150.),
            initial: Initial::new(15., 60., 15.),
            building: BuildingParams::new(250., 0.25, 0.20),
            coupling: CouplingParams::new(2.0),
        }
    }

    #[fixture]
    fn heated_actuation() -> ActuationResolved {
        ActuationResolved::new(2.0, 10_000.)
    }

    #[fixture]
    fn metered_actuation() -> ActuationResolved {
        ActuationResolved {
            heater_gas_m3_h: 2.5,
            heater_elec_w: 300.,
            cooling_elec_w: 1500.,
            vents_elec_w: 80.,
            ..ActuationResolved::new(2.0, 10_000.)
        }
    }

    #[rstest]
    fn should_produce_eleven_rows_for_ten_minute_window(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        let result = winter_greenhouse
            .run(&heated_actuation, None, &SimulationTime::new(60., 600.))
            .unwrap();

        assert_eq!(result.rows.len(), 11);
        let t_mins: Vec<f64> = result.rows.iter().map(|row| row.t_min).collect();
        assert_eq!(t_mins, (0..=10).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[rstest]
    fn should_match_reference_final_state(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        let result = winter_greenhouse
            .run(&heated_actuation, None, &SimulationTime::new(60., 600.))
            .unwrap();

        assert_relative_eq!(
            result.summary.temp_air_final_c,
            13.707343923832264,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            result.summary.rel_humidity_air_final_pct,
            88.67955116068937,
            max_relative = 1e-9
        );
        assert_eq!(result.summary.temp_outside_c, -10.);
    }

    #[rstest]
    fn should_warm_air_relative_to_unheated_run(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        let simulation_time = SimulationTime::new(60., 600.);
        let heated = winter_greenhouse
            .run(&heated_actuation, None, &simulation_time)
            .unwrap();
        let unheated = winter_greenhouse
            .run(&ActuationResolved::new(2.0, 0.), None, &simulation_time)
            .unwrap();

        assert_relative_eq!(
            unheated.summary.temp_air_final_c,
            11.580989613859726,
            max_relative = 1e-9
        );
        for (heated_row, unheated_row) in heated.rows.iter().zip(unheated.rows.iter()) {
            assert!(heated_row.temp_air_c > unheated_row.temp_air_c);
        }
    }

    #[rstest]
    fn first_row_holds_state_after_one_step_not_initial_state(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        let result = winter_greenhouse
            .run(&heated_actuation, None, &SimulationTime::new(60., 600.))
            .unwrap();
        let first = &result.rows[0];

        assert_eq!(first.t_min, 0.);
        assert_relative_eq!(first.temp_air_c, 14.865598078197483, max_relative = 1e-12);
        assert_relative_eq!(
            first.rel_humidity_air_pct,
            67.42943918210659,
            max_relative = 1e-9
        );
        assert!(first.temp_air_c != winter_greenhouse.initial.temp_air);
    }

    #[rstest]
    fn should_be_deterministic(winter_greenhouse: Greenhouse, metered_actuation: ActuationResolved) {
        let simulation_time = SimulationTime::new(30., 1800.);
        let first = winter_greenhouse
            .run(&metered_actuation, None, &simulation_time)
            .unwrap();
        let second = winter_greenhouse
            .run(&metered_actuation, None, &simulation_time)
            .unwrap();

        assert_eq!(first, second);
    }

    #[rstest]
    #[case(60., 600., 11)]
    #[case(60., 0., 1)]
    #[case(90., 60., 1)]
    #[case(45., 1000., 23)]
    #[case(600., 7200., 13)]
    fn should_follow_row_count_law(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
        #[case] step: f64,
        #[case] elapsed: f64,
        #[case] expected_rows: usize,
    ) {
        let result = winter_greenhouse
            .run(&heated_actuation, None, &SimulationTime::new(step, elapsed))
            .unwrap();

        assert_eq!(result.rows.len(), expected_rows);
        assert_eq!(
            expected_rows,
            (elapsed / step).floor() as usize + 1,
            "case does not follow floor(elapsed / step) + 1"
        );
    }

    #[rstest]
    fn should_keep_humidity_and_rh_in_bounds(
        winter_greenhouse: Greenhouse,
        metered_actuation: ActuationResolved,
    ) {
        let result = winter_greenhouse
            .run(&metered_actuation, None, &SimulationTime::new(60., 7200.))
            .unwrap();

        for row in &result.rows {
            assert!(row.abs_humidity_air >= 0.);
            assert!((0.0..=100.0).contains(&row.rel_humidity_air_pct));
        }
    }

    #[rstest]
    fn should_hold_airflow_constant_over_run(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        let result = winter_greenhouse
            .run(&heated_actuation, None, &SimulationTime::new(60., 3600.))
            .unwrap();
        let summary = result.summary;

        assert_relative_eq!(summary.airflow_final_m3_s, 800. * 2. / 3600.);
        assert_relative_eq!(summary.airflow_final_m3_s, summary.airflow_avg_m3_s);
        assert_eq!(summary.ach_final_1_h, 2.);
        assert_relative_eq!(summary.ach_final_1_h, summary.ach_avg_1_h);
    }

    #[rstest]
    fn should_accumulate_energy_monotonically(
        winter_greenhouse: Greenhouse,
        metered_actuation: ActuationResolved,
    ) {
        let result = winter_greenhouse
            .run(&metered_actuation, None, &SimulationTime::new(60., 600.))
            .unwrap();

        for pair in result.rows.windows(2) {
            assert!(pair[1].heater_gas_m3_cum >= pair[0].heater_gas_m3_cum);
            assert!(pair[1].heater_elec_kwh_cum >= pair[0].heater_elec_kwh_cum);
            assert!(pair[1].cooling_elec_kwh_cum >= pair[0].cooling_elec_kwh_cum);
            assert!(pair[1].vents_elec_kwh_cum >= pair[0].vents_elec_kwh_cum);
            assert!(pair[1].total_elec_kwh_cum >= pair[0].total_elec_kwh_cum);
        }

        let summary = result.summary;
        assert_relative_eq!(summary.heater_gas_total_m3, 0.45833333333333337, max_relative = 1e-12);
        assert_relative_eq!(summary.heater_elec_total_kwh, 0.05499999999999999, max_relative = 1e-12);
        assert_relative_eq!(summary.cooling_elec_total_kwh, 0.27499999999999997, max_relative = 1e-12);
        assert_relative_eq!(summary.total_elec_kwh, 0.3446666666666666, max_relative = 1e-12);

        let last = result.rows.last().unwrap();
        assert_relative_eq!(
            last.cooling_total_elec_kwh_cum,
            last.cooling_elec_kwh_cum + last.vents_elec_kwh_cum
        );
        assert_eq!(last.heater_gas_m3_h_rate, 2.5);
        assert_relative_eq!(last.heater_gas_m3_step, 2.5 / 60.);
    }

    #[rstest]
    fn should_label_all_triggers_for_heated_sunny_ventilated_crop(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        let result = winter_greenhouse
            .run(&heated_actuation, None, &SimulationTime::new(60., 600.))
            .unwrap();

        for row in &result.rows {
            assert_eq!(
                row.triggers,
                "heater|solar|ventilation|transpiration|canopy_convection"
            );
        }
    }

    #[rstest]
    fn should_label_idle_dark_bare_saturated_greenhouse_as_none() {
        // supersaturated start: no vapour pressure deficit, so no transpiration
        let greenhouse = Greenhouse {
            geometry: Geometry::new(20., 10., 4.),
            outside: Outside::new(-10., 70., 0.),
            initial: Initial::new(15., 105., 15.),
            building: BuildingParams::new(250., 0.25, 0.20),
            coupling: CouplingParams::new(0.),
        };
        let result = greenhouse
            .run(&ActuationResolved::new(0., 0.), None, &SimulationTime::new(60., 300.))
            .unwrap();

        for row in &result.rows {
            assert_eq!(row.triggers, "none");
            assert_eq!(row.transpiration_w, 0.);
        }
    }

    #[rstest]
    fn should_use_crop_area_override(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        let result = winter_greenhouse
            .run(&heated_actuation, Some(120.), &SimulationTime::new(60., 600.))
            .unwrap();

        assert_relative_eq!(
            result.summary.temp_air_final_c,
            13.884584340691829,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            result.summary.rel_humidity_air_final_pct,
            88.3935589779008,
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn should_reject_zero_crop_area(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        assert_eq!(
            winter_greenhouse.run(&heated_actuation, Some(0.), &SimulationTime::default()),
            Err(SimulationError::NonPositiveCropArea(0.))
        );
    }

    #[rstest]
    fn should_reject_non_positive_timestep(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        assert_eq!(
            winter_greenhouse.run(&heated_actuation, None, &SimulationTime::new(0., 600.)),
            Err(SimulationError::NonPositiveTimestep(0.))
        );
    }

    #[rstest]
    fn should_reject_window_with_uncountable_steps(
        winter_greenhouse: Greenhouse,
        heated_actuation: ActuationResolved,
    ) {
        assert_eq!(
            winter_greenhouse.run(&heated_actuation, None, &SimulationTime::new(1e-300, 1e300)),
            Err(SimulationError::TooManySteps {
                step: 1e-300,
                elapsed: 1e300
            })
        );
    }

    #[rstest]
    fn should_fail_when_saturation_pressure_overflows(mut winter_greenhouse: Greenhouse) {
        // just below the Magnus-Tetens pole the exponent overflows to infinity
        winter_greenhouse.initial = Initial::new(-243.05, 60., 15.);

        assert!(matches!(
            winter_greenhouse.run(
                &ActuationResolved::new(2.0, 10_000.),
                None,
                &SimulationTime::default()
            ),
            Err(SimulationError::NonFiniteState { index: 0, .. })
        ));
    }
}
