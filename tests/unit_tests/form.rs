use nalgebra::Point2;
use regionfem::form::{dx, BilinearForm, BilinearIntegrand, Coefficient, LinearForm, Measure};
use regionfem::mesh::procedural::{create_unit_square_uniform_tri_mesh_2d, Diagonal};
use regionfem::region::{NamedRegion, Selector};
use regionfem::space::FunctionSpace;

fn p1_space() -> FunctionSpace {
    FunctionSpace::new(create_unit_square_uniform_tri_mesh_2d(2, 2, Diagonal::Right), 1).unwrap()
}

#[test]
fn constant_arithmetic_folds() {
    let f = Coefficient::constant(3.0);
    let g = Coefficient::from(5.0);
    let half_sum = (f.clone() + g.clone()) / 2.0;
    assert_eq!(half_sum.as_constant(), Some(4.0));
    assert_eq!((-half_sum).as_constant(), Some(-4.0));
    assert_eq!((f.clone() - g.clone()).as_constant(), Some(-2.0));
    assert_eq!((f.clone() * g).as_constant(), Some(15.0));
    assert_eq!((f * 0.5).as_constant(), Some(1.5));
}

#[test]
fn field_arithmetic_evaluates_pointwise() {
    let x = Coefficient::field(|p| p.x);
    let c = (x.clone() + Coefficient::constant(1.0)) * x / 2.0;
    assert_eq!(c.as_constant(), None);
    let p = Point2::new(3.0, -1.0);
    assert_eq!(c.evaluate(&p), 6.0);
    assert_eq!((-c).evaluate(&p), -6.0);
}

#[test]
fn coefficient_formatting() {
    assert_eq!(Coefficient::constant(0.001).to_string(), "0.001");
    assert_eq!(Coefficient::field(|_| 1.0).to_string(), "c(x)");
    assert_eq!(format!("{:?}", Coefficient::constant(2.0)), "Constant(2.0)");
}

#[test]
fn measures() {
    assert_eq!(Measure::everywhere().selector(), &Selector::Everywhere);
    assert_eq!(dx(2usize).selector(), &Selector::Tag(2));
    assert_eq!(dx("Mid").selector(), &Selector::Named("Mid".to_string()));

    let region = NamedRegion::new("RightAndMid", [2, 3]);
    assert_eq!(dx(&region).selector(), &Selector::Region(region.clone()));
    assert_eq!(dx(&region).to_string(), "dx(RightAndMid)");
    assert_eq!(Measure::everywhere().to_string(), "dx(everywhere)");
}

#[test]
fn bilinear_form_terms_in_order() {
    let space = p1_space();
    let a = BilinearForm::new(&space)
        .with_grad_dot_grad(1e-3, Measure::everywhere())
        .with_product(1.0, dx(1usize));

    assert_eq!(a.space(), space.signature());
    assert_eq!(a.terms().len(), 2);
    assert_eq!(a.terms()[0].integrand, BilinearIntegrand::GradDotGrad);
    assert_eq!(a.terms()[0].coefficient.as_constant(), Some(1e-3));
    assert_eq!(a.terms()[1].integrand, BilinearIntegrand::Product);
    assert_eq!(a.terms()[1].measure, dx(1usize));
    assert_eq!(
        a.to_string(),
        "0.001 grad(u)·grad(v) dx(everywhere) + 1 u v dx(1)"
    );
}

#[test]
fn linear_form_with_overlapping_regions() {
    let space = p1_space();
    let f = Coefficient::constant(3.0);
    let g = Coefficient::constant(5.0);
    let l = LinearForm::new(&space)
        .with_source(f.clone(), dx("RightAndMid"))
        .with_source(g.clone(), dx("LeftAndMid"))
        .with_source(-((f + g) / 2.0), dx("Mid"));

    assert_eq!(l.terms().len(), 3);
    assert_eq!(l.terms()[2].coefficient.as_constant(), Some(-4.0));
    assert_eq!(
        l.to_string(),
        "3 v dx(RightAndMid) + 5 v dx(LeftAndMid) + -4 v dx(Mid)"
    );
}

#[test]
fn empty_forms() {
    let space = p1_space();
    let a = BilinearForm::new(&space);
    let l = LinearForm::for_signature(space.signature());
    assert!(a.terms().is_empty());
    assert!(l.terms().is_empty());
    assert_eq!(a.to_string(), "0");
    assert_eq!(l.to_string(), "0");
}
