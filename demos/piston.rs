use fortune_voronoi::vector2::Vector2;
use piston_window::*;
use rand::Rng;

const WINDOW_WIDTH: f64 = 720.0;
const WINDOW_HEIGHT: f64 = 720.0;

const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.3, 0.3, 1.0, 1.0];

const POINT_SIZE: f64 = 2.0;
const LINE_WIDTH: f64 = 0.5;
const VIEW_MARGIN: f64 = 10.0;

const NUM_POINTS: usize = 10_000;

fn diagram_to_canvas(point: Vector2) -> Vector2 {
    Vector2::new(
        (point.x * (WINDOW_WIDTH - 2.0 * VIEW_MARGIN)) + VIEW_MARGIN,
        (point.y * (WINDOW_HEIGHT - 2.0 * VIEW_MARGIN)) + VIEW_MARGIN,
    )
}

fn draw_point<G: Graphics>(point: Vector2, pen: Rectangle, c: Context, g: &mut G) {
    let point = diagram_to_canvas(point);
    let rectangle = [
        point.x - POINT_SIZE / 2.0,
        point.y - POINT_SIZE / 2.0,
        POINT_SIZE,
        POINT_SIZE,
    ];
    pen.draw(rectangle, &c.draw_state, c.transform, g);
}

fn draw_edge<G: Graphics>(from: Vector2, to: Vector2, pen: Line, c: Context, g: &mut G) {
    let from = diagram_to_canvas(from);
    let to = diagram_to_canvas(to);
    pen.draw([from.x, from.y, to.x, to.y], &c.draw_state, c.transform, g);
}

fn main() {
    let mut points: Vec<Vector2> = vec![];
    let mut rng = rand::thread_rng();
    for _ in 0..NUM_POINTS {
        points.push(Vector2::new(rng.gen(), rng.gen()));
    }

    let points = fortune_voronoi::lloyds_relaxation(&points, 1.0, 1.0, 5)
        .expect("relaxation failed on a well-formed random point set");
    let diagram = fortune_voronoi::compute(&points, 1.0, 1.0).expect("failed to compute diagram");

    let vertices: Vec<Vector2> = diagram.vertices().into_iter().map(|(_, point)| point).collect();
    let edges: Vec<(Vector2, Vector2)> = diagram
        .edges()
        .map(|(edge, _)| {
            let a = diagram.vertex_point(diagram.edge_a(edge).expect("finished edge missing endpoint a"));
            let b = diagram.vertex_point(diagram.edge_b(edge).expect("finished edge missing endpoint b"));
            (a, b)
        })
        .collect();

    let mut window: PistonWindow = WindowSettings::new("Voronoi", [WINDOW_WIDTH, WINDOW_HEIGHT])
        .exit_on_esc(true)
        .build()
        .unwrap_or_else(|e| panic!("Failed to build PistonWindow: {}", e));

    window.set_lazy(true);
    while let Some(e) = window.next() {
        window.draw_2d(&e, |c, g| {
            clear(BLACK, g);
            for &(a, b) in &edges {
                let pen = Line::new(GREEN, LINE_WIDTH / 2.0);
                draw_edge(a, b, pen, c, g);
            }
            for &vertex in &vertices {
                let pen = Rectangle::new(BLUE);
                draw_point(vertex, pen, c, g);
            }
        });
    }
}
